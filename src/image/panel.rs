use std::path::Path;

use crate::{
    foundation::{core::Canvas, error::ComicResult},
    output::write_png_atomic,
};

/// Where a panel's pixels came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelOrigin {
    /// Rendered by the image engine.
    Engine,
    /// The engine failed and the placeholder image was substituted.
    Fallback {
        /// Engine error that triggered the substitution.
        reason: String,
    },
}

/// One comic panel: a straight-alpha RGBA8 raster plus its provenance.
#[derive(Clone, Debug)]
pub struct Panel {
    image: image::RgbaImage,
    origin: PanelOrigin,
}

impl Panel {
    /// A panel produced by an engine.
    pub fn new(image: image::RgbaImage) -> Self {
        Self {
            image,
            origin: PanelOrigin::Engine,
        }
    }

    pub(crate) fn fallback(image: image::RgbaImage, reason: impl Into<String>) -> Self {
        Self {
            image,
            origin: PanelOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut image::RgbaImage {
        &mut self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn origin(&self) -> &PanelOrigin {
        &self.origin
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, PanelOrigin::Fallback { .. })
    }

    /// Write the panel as PNG to `dest`.
    pub fn save(&self, dest: &Path) -> ComicResult<()> {
        write_png_atomic(
            dest,
            self.image.as_raw(),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/panel.rs"]
mod tests;
