use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::foundation::{
    core::{Canvas, Point},
    error::{ComicError, ComicResult},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl TextBrushRgba8 {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// Font used to draw panel captions: raw bytes plus the handle the rasterizer needs.
#[derive(Clone)]
pub struct CaptionFont {
    bytes: Arc<Vec<u8>>,
    family: String,
    data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family", &self.family)
            .field("font_bytes_len", &self.bytes.len())
            .finish()
    }
}

impl CaptionFont {
    /// Validate font bytes by registering them with a layout context.
    pub fn from_bytes(bytes: Vec<u8>) -> ComicResult<Self> {
        let family = TextLayoutEngine::new().register(&bytes)?;
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.clone()),
            0,
        );
        Ok(Self {
            bytes: Arc::new(bytes),
            family,
            data,
        })
    }

    pub fn from_path(path: &Path) -> ComicResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font bytes and return the primary family name.
    pub fn register(&mut self, font_bytes: &[u8]) -> ComicResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ComicError::validation("no font families registered from font bytes")
        })?;

        self.font_ctx
            .collection
            .family_name(family_id)
            .map(str::to_string)
            .ok_or_else(|| ComicError::validation("registered font family has no name"))
    }

    /// Shape and lay out `text` on a single unbounded line box (no wrapping).
    ///
    /// Explicit newlines still start new lines.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font: &CaptionFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ComicResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ComicError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.register(font.bytes())?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Rasterize a laid-out text block onto a transparent canvas with its top-left at `origin`.
///
/// Returns premultiplied RGBA8 bytes covering the whole canvas. Glyphs falling outside the canvas
/// are clipped.
pub fn rasterize_text(
    layout: &parley::Layout<TextBrushRgba8>,
    font: &CaptionFont,
    canvas: Canvas,
    origin: Point,
) -> ComicResult<Vec<u8>> {
    let (w, h) = canvas.as_u16()?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font.data)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
