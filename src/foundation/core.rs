use crate::foundation::error::{ComicError, ComicResult};

pub use kurbo::Point;

/// Canonical panel edge length in pixels.
pub const PANEL_SIZE: u32 = 512;

/// Pixel dimensions of a panel or strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// The canonical 512x512 panel canvas.
    pub const PANEL: Canvas = Canvas {
        width: PANEL_SIZE,
        height: PANEL_SIZE,
    };

    /// Validated canvas. Both sides must be non-zero and fit the rasterizer's `u16` surfaces.
    pub fn new(width: u32, height: u32) -> ComicResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComicError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ComicError::validation(format!(
                "canvas {width}x{height} exceeds {}x{}",
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    pub fn as_u16(self) -> ComicResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| ComicError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| ComicError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::PANEL
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
