use std::path::{Path, PathBuf};

/// Convenience result type used across comicraft.
pub type ComicResult<T> = Result<T, ComicError>;

/// Top-level error taxonomy of the comic pipeline.
///
/// Only [`ComicError::ImageGeneration`] is recoverable: [`crate::ImageSource`] absorbs it by
/// substituting a placeholder panel. Every other variant aborts the run it occurs in.
#[derive(thiserror::Error, Debug)]
pub enum ComicError {
    /// Invalid caller-provided input, configuration or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// The story source could not produce a story.
    #[error("story generation error: {0}")]
    StoryGeneration(String),

    /// An image engine failed to render a prompt.
    #[error("image generation error: {0}")]
    ImageGeneration(String),

    /// The strip composer was handed zero panels.
    #[error("no panels to combine")]
    EmptyPanelSet,

    /// Creating the output directory or writing an image failed.
    #[error("filesystem error at '{}': {source}", path.display())]
    Filesystem {
        /// Path the failed operation targeted.
        path: PathBuf,
        /// Underlying IO or encoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComicError {
    /// Build a [`ComicError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ComicError::StoryGeneration`] value.
    pub fn story(msg: impl Into<String>) -> Self {
        Self::StoryGeneration(msg.into())
    }

    /// Build a [`ComicError::ImageGeneration`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageGeneration(msg.into())
    }

    /// Build a [`ComicError::Filesystem`] value for `path`.
    pub fn filesystem(
        path: impl AsRef<Path>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    /// Whether the pipeline treats this error as fatal for a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ImageGeneration(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
