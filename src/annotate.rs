use crate::{
    foundation::{
        core::Point,
        error::{ComicError, ComicResult},
    },
    image::panel::Panel,
    render::{
        composite::{PremulRgba8, over_straight, overlay_premul, premultiply},
        fonts::FontLibrary,
        text::{CaptionFont, TextBrushRgba8, TextLayoutEngine, rasterize_text},
    },
};

/// Inset of the caption band from the left, right and top panel edges.
pub const BAND_INSET: u32 = 10;
/// Last pixel row covered by the caption band.
pub const BAND_BOTTOM: u32 = 100;
/// Straight-alpha band color: black at half opacity.
pub const BAND_COLOR: [u8; 4] = [0, 0, 0, 128];
/// Top-left of the caption text.
pub const CAPTION_ORIGIN: (f64, f64) = (20.0, 20.0);
pub const DEFAULT_CAPTION_SIZE_PX: f32 = 20.0;

/// Draws the translucent caption band and the caption text onto panels.
#[derive(Clone, Debug)]
pub struct PanelAnnotator {
    font: Option<CaptionFont>,
    font_size_px: f32,
}

impl Default for PanelAnnotator {
    fn default() -> Self {
        Self::without_text()
    }
}

impl PanelAnnotator {
    /// Annotator drawing captions with `font`. `None` draws only the band.
    pub fn new(font: Option<CaptionFont>) -> Self {
        if font.is_none() {
            tracing::warn!("no caption font available, panels get the band without text");
        }
        Self {
            font,
            font_size_px: DEFAULT_CAPTION_SIZE_PX,
        }
    }

    /// Annotator using the best caption font `fonts` can resolve.
    pub fn from_library(fonts: &FontLibrary) -> Self {
        Self::new(fonts.caption_font())
    }

    /// Annotator that draws the band only, without logging.
    pub fn without_text() -> Self {
        Self {
            font: None,
            font_size_px: DEFAULT_CAPTION_SIZE_PX,
        }
    }

    pub fn with_font_size(mut self, size_px: f32) -> ComicResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ComicError::validation(
                "caption font size must be finite and > 0",
            ));
        }
        self.font_size_px = size_px;
        Ok(self)
    }

    pub fn font(&self) -> Option<&CaptionFont> {
        self.font.as_ref()
    }

    pub fn font_size_px(&self) -> f32 {
        self.font_size_px
    }

    /// Draw the band and `caption` onto `panel` in place. Never fails.
    pub fn annotate(&self, panel: &mut Panel, caption: &str) {
        draw_band(panel.image_mut());

        let Some(font) = &self.font else {
            return;
        };
        if caption.trim().is_empty() {
            return;
        }
        if let Err(e) = self.draw_caption(panel, font, caption) {
            tracing::warn!(error = %e, "caption text could not be drawn");
        }
    }

    fn draw_caption(
        &self,
        panel: &mut Panel,
        font: &CaptionFont,
        caption: &str,
    ) -> ComicResult<()> {
        let mut engine = TextLayoutEngine::new();
        let layout =
            engine.layout_plain(caption, font, self.font_size_px, TextBrushRgba8::WHITE)?;
        let origin = Point::new(CAPTION_ORIGIN.0, CAPTION_ORIGIN.1);
        let overlay = rasterize_text(&layout, font, panel.canvas(), origin)?;
        overlay_premul(panel.image_mut(), &overlay)
    }
}

/// Inclusive pixel bounds `(x0, y0, x1, y1)` of the band for an image, if any pixel is covered.
pub fn band_bounds(width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let x0 = BAND_INSET;
    let y0 = BAND_INSET;
    let x1 = width.checked_sub(BAND_INSET)?.min(width - 1);
    let y1 = BAND_BOTTOM.min(height - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

fn draw_band(img: &mut image::RgbaImage) {
    let Some((x0, y0, x1, y1)) = band_bounds(img.width(), img.height()) else {
        return;
    };
    let band: PremulRgba8 = premultiply(BAND_COLOR);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = img.get_pixel_mut(x, y);
            px.0 = over_straight(px.0, band);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/annotate.rs"]
mod tests;
