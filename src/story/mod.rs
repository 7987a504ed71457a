//! Story model, free-form parsing and story sources.

/// Theme, section and story types.
pub mod model;
/// Numbered-section parser for free-form generator output.
pub mod parse;
/// The [`StorySource`](source::StorySource) trait and its implementations.
pub mod source;
