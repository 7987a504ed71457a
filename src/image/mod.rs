//! Panel images: engines, prompt shaping, the placeholder and the never-failing source.

/// The [`ImageEngine`](engine::ImageEngine) trait and built-in engines.
pub mod engine;
/// Placeholder image used when an engine fails.
pub mod fallback;
/// Panel raster type.
pub mod panel;
/// Prompt construction and shaping.
pub mod prompt;
/// [`ImageSource`](source::ImageSource): engine wrapper with a guaranteed result.
pub mod source;
