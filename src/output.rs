//! Per-run output directory layout and atomic PNG writes.

use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{ComicError, ComicResult},
    story::model::Section,
};

/// Directory used when the caller does not choose one.
pub const DEFAULT_OUTPUT_DIR: &str = "comic_output";

/// File name of the composed strip.
pub const STRIP_FILE_NAME: &str = "final_comic.png";

/// `panel_<section>.png`.
pub fn panel_file_name(section: Section) -> String {
    format!("panel_{}.png", section.key())
}

/// The directory one pipeline run writes into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if missing. Idempotent.
    pub fn ensure(&self) -> ComicResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| ComicError::filesystem(&self.root, e))
    }

    pub fn panel_path(&self, section: Section) -> PathBuf {
        self.root.join(panel_file_name(section))
    }

    pub fn strip_path(&self) -> PathBuf {
        self.root.join(STRIP_FILE_NAME)
    }

    /// Panel files present on disk, in story order.
    pub fn discover_panels(&self) -> Vec<(Section, PathBuf)> {
        Section::ALL
            .into_iter()
            .map(|s| (s, self.panel_path(s)))
            .filter(|(_, p)| p.is_file())
            .collect()
    }
}

impl Default for OutputDir {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// Removes a partially written file unless disarmed.
struct PartialFileGuard(Option<PathBuf>);

impl PartialFileGuard {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Encode `data` as PNG at `dest` without ever exposing a truncated file.
///
/// The image is written to `<dest>.partial` and renamed into place.
pub(crate) fn write_png_atomic(
    dest: &Path,
    data: &[u8],
    width: u32,
    height: u32,
    color: image::ColorType,
) -> ComicResult<()> {
    let mut partial = dest.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let guard = PartialFileGuard(Some(partial.clone()));
    image::save_buffer_with_format(
        &partial,
        data,
        width,
        height,
        color,
        image::ImageFormat::Png,
    )
    .map_err(|e| ComicError::filesystem(dest, e))?;
    std::fs::rename(&partial, dest).map_err(|e| ComicError::filesystem(dest, e))?;
    guard.disarm();
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/output.rs"]
mod tests;
