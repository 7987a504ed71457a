//! JSON run configuration: backends, geometry, captions and scheduling.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    annotate::{DEFAULT_CAPTION_SIZE_PX, PanelAnnotator},
    external::{DEFAULT_TIMEOUT_SECS, ExternalCommand},
    foundation::{
        core::Canvas,
        error::{ComicError, ComicResult},
    },
    image::{
        engine::{CommandEngine, FallbackOnlyEngine, ImageEngine, ProceduralEngine},
        source::ImageSource,
    },
    output::DEFAULT_OUTPUT_DIR,
    pipeline::{ComicPipeline, PipelineOpts},
    render::{fonts::FontLibrary, text::CaptionFont},
    story::source::{CommandStorySource, StaticStorySource, StorySource, TemplateStorySource},
};

/// Top-level configuration. Every field has a default, so `{}` is a valid file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComicConfig {
    pub output_dir: PathBuf,
    pub panel_size: Canvas,
    pub caption: CaptionConfig,
    pub story: StoryBackend,
    pub image: ImageBackend,
    pub parallel: bool,
    pub threads: Option<usize>,
}

impl Default for ComicConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            panel_size: Canvas::PANEL,
            caption: CaptionConfig::default(),
            story: StoryBackend::default(),
            image: ImageBackend::default(),
            parallel: false,
            threads: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// Explicit caption font; system fonts are searched when unset.
    pub font_path: Option<PathBuf>,
    pub font_size_px: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_px: DEFAULT_CAPTION_SIZE_PX,
        }
    }
}

/// An external generator invocation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl CommandConfig {
    fn validate(&self, what: &str) -> ComicResult<()> {
        if self.program.trim().is_empty() {
            return Err(ComicError::validation(format!(
                "{what} command 'program' must be non-empty"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ComicError::validation(format!(
                "{what} command 'timeout_secs' must be >= 1"
            )));
        }
        Ok(())
    }

    fn to_command(&self) -> ExternalCommand {
        ExternalCommand::new(self.program.clone(), self.args.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoryBackend {
    /// Offline phrase templates.
    #[default]
    Template,
    /// External text generator.
    Command(CommandConfig),
    /// A fixed story loaded from JSON.
    Static { path: PathBuf },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageBackend {
    /// Offline procedural renderer.
    #[default]
    Procedural,
    /// External image generator.
    Command(CommandConfig),
    /// Always the placeholder image.
    FallbackOnly,
}

impl ComicConfig {
    /// Read and validate a config file.
    pub fn from_path(path: &Path) -> ComicResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config JSON '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ComicResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ComicError::validation("config 'output_dir' must be non-empty"));
        }
        Canvas::new(self.panel_size.width, self.panel_size.height)?;
        if !self.caption.font_size_px.is_finite() || self.caption.font_size_px <= 0.0 {
            return Err(ComicError::validation(
                "config 'caption.font_size_px' must be finite and > 0",
            ));
        }
        self.pipeline_opts().validate()?;
        if let StoryBackend::Command(cmd) = &self.story {
            cmd.validate("story")?;
        }
        if let ImageBackend::Command(cmd) = &self.image {
            cmd.validate("image")?;
        }
        Ok(())
    }

    pub fn pipeline_opts(&self) -> PipelineOpts {
        PipelineOpts {
            parallel: self.parallel,
            threads: self.threads,
        }
    }

    pub fn build_story_source(&self) -> ComicResult<Box<dyn StorySource>> {
        let source: Box<dyn StorySource> = match &self.story {
            StoryBackend::Template => Box::new(TemplateStorySource),
            StoryBackend::Command(cmd) => Box::new(CommandStorySource::new(cmd.to_command())),
            StoryBackend::Static { path } => Box::new(StaticStorySource::from_json_path(path)?),
        };
        Ok(source)
    }

    pub fn build_image_source(&self, fonts: &FontLibrary) -> ComicResult<ImageSource> {
        let engine: Box<dyn ImageEngine> = match &self.image {
            ImageBackend::Procedural => Box::new(ProceduralEngine),
            ImageBackend::Command(cmd) => Box::new(CommandEngine::new(cmd.to_command())),
            ImageBackend::FallbackOnly => Box::new(FallbackOnlyEngine),
        };
        let canvas = Canvas::new(self.panel_size.width, self.panel_size.height)?;
        Ok(ImageSource::new(engine, fonts.clone()).with_canvas(canvas))
    }

    /// Caption annotator: the configured font file, else the best system face.
    pub fn build_annotator(&self, fonts: &FontLibrary) -> ComicResult<PanelAnnotator> {
        let font = match &self.caption.font_path {
            Some(path) => Some(CaptionFont::from_path(path)?),
            None => fonts.caption_font(),
        };
        PanelAnnotator::new(font).with_font_size(self.caption.font_size_px)
    }

    /// Validate and assemble the whole pipeline.
    pub fn build(&self, fonts: &FontLibrary) -> ComicResult<ComicPipeline> {
        self.validate()?;
        Ok(ComicPipeline::new(
            self.build_story_source()?,
            self.build_image_source(fonts)?,
            self.build_annotator(fonts)?,
        )
        .with_opts(self.pipeline_opts()))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
