use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{ComicError, ComicResult},
    image::panel::Panel,
    output::write_png_atomic,
};

/// Background of the strip canvas, visible where panels are narrower than the widest one.
pub const STRIP_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Vertical stacking geometry for a strip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripLayout {
    pub width: u32,
    pub height: u32,
    /// Top edge of each panel, in input order.
    pub offsets: Vec<u32>,
}

impl StripLayout {
    /// Stack panels of the given `(width, height)` sizes top to bottom, left-aligned.
    pub fn for_sizes(sizes: &[(u32, u32)]) -> ComicResult<Self> {
        if sizes.is_empty() {
            return Err(ComicError::EmptyPanelSet);
        }

        let mut offsets = Vec::with_capacity(sizes.len());
        let mut width = 0u32;
        let mut height = 0u32;
        for &(w, h) in sizes {
            offsets.push(height);
            width = width.max(w);
            height = height
                .checked_add(h)
                .ok_or_else(|| ComicError::validation("strip height overflows u32"))?;
        }

        if width == 0 || height == 0 {
            return Err(ComicError::validation("strip has zero area"));
        }
        Ok(Self {
            width,
            height,
            offsets,
        })
    }

    pub fn for_panels(panels: &[Panel]) -> ComicResult<Self> {
        let sizes: Vec<(u32, u32)> = panels.iter().map(|p| (p.width(), p.height())).collect();
        Self::for_sizes(&sizes)
    }
}

/// Stack `panels` vertically onto a white RGB canvas. Alpha is dropped, not blended.
pub fn compose_image(panels: &[Panel]) -> ComicResult<image::RgbImage> {
    let layout = StripLayout::for_panels(panels)?;
    let mut canvas =
        image::RgbImage::from_pixel(layout.width, layout.height, image::Rgb(STRIP_BACKGROUND));

    for (panel, &offset) in panels.iter().zip(&layout.offsets) {
        let rgb = image::DynamicImage::ImageRgba8(panel.image().clone()).into_rgb8();
        image::imageops::replace(&mut canvas, &rgb, 0, i64::from(offset));
    }
    Ok(canvas)
}

/// Compose `panels` into one strip and write it as PNG to `destination`.
///
/// Nothing is written when `panels` is empty.
pub fn compose(panels: &[Panel], destination: &Path) -> ComicResult<PathBuf> {
    let strip = compose_image(panels)?;
    write_png_atomic(
        destination,
        strip.as_raw(),
        strip.width(),
        strip.height(),
        image::ColorType::Rgb8,
    )?;
    tracing::debug!(
        path = %destination.display(),
        width = strip.width(),
        height = strip.height(),
        "strip written"
    );
    Ok(destination.to_path_buf())
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
