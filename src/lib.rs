//! comicraft turns a short theme into a four-panel captioned comic strip.
//!
//! A run goes through four stages, each behind its own handle:
//!
//! - a [`StorySource`] writes the four beats (introduction, storyline, climax, moral)
//! - an [`ImageSource`] renders one panel per beat and never fails: engine errors become a
//!   placeholder panel
//! - a [`PanelAnnotator`] draws the caption band and text onto each panel
//! - [`compose()`] stacks the panels into `final_comic.png`
//!
//! [`ComicPipeline`] drives the stages and writes `panel_<section>.png` files plus the strip into
//! an output directory. [`ComicConfig`] builds a pipeline from JSON.
#![forbid(unsafe_code)]

mod foundation;

/// Caption band and caption text.
pub mod annotate;
/// Strip composition.
pub mod compose;
/// JSON configuration and pipeline assembly.
pub mod config;
pub mod external;
/// Panel engines, prompts and the never-failing image source.
pub mod image;
/// Output directory layout and atomic PNG writes.
pub mod output;
/// End-to-end orchestration.
pub mod pipeline;
/// CPU raster helpers used by the annotator and the placeholder.
pub mod render;
/// Story model, parsing and sources.
pub mod story;

pub use crate::foundation::core::{Canvas, PANEL_SIZE, Point};
pub use crate::foundation::error::{ComicError, ComicResult};

pub use crate::annotate::PanelAnnotator;
pub use crate::compose::{StripLayout, compose, compose_image};
pub use crate::config::{CaptionConfig, ComicConfig, CommandConfig, ImageBackend, StoryBackend};
pub use crate::external::ExternalCommand;
pub use crate::image::engine::{CommandEngine, FallbackOnlyEngine, ImageEngine, ProceduralEngine};
pub use crate::image::panel::{Panel, PanelOrigin};
pub use crate::image::source::ImageSource;
pub use crate::output::{DEFAULT_OUTPUT_DIR, OutputDir, STRIP_FILE_NAME, panel_file_name};
pub use crate::pipeline::{ComicPipeline, ComicRun, PanelFile, PipelineOpts};
pub use crate::render::fonts::FontLibrary;
pub use crate::render::text::CaptionFont;
pub use crate::story::model::{DEFAULT_THEME, Section, Story, Theme};
pub use crate::story::parse::parse_story;
pub use crate::story::source::{
    CommandStorySource, StaticStorySource, StorySource, TemplateStorySource,
};
