use std::sync::Arc;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Canvas,
        error::{ComicError, ComicResult},
    },
    render::{
        composite::premul_to_image,
        fonts::{FontLibrary, svg_font_resolver},
    },
};

/// Off-white fill of the placeholder panel.
pub const FALLBACK_BACKGROUND: [u8; 3] = [255, 253, 245];

/// Placeholder caption, one entry per line.
pub const FALLBACK_CAPTION: [&str; 2] = ["COMIC IMAGE", "WILL APPEAR HERE"];

/// The deterministic placeholder substituted when an engine fails.
///
/// The caption is centered and drawn with whatever sans-serif face `fonts` provides. Without
/// fonts (or if the SVG cannot be rasterized) the plain off-white canvas is returned.
pub fn fallback_image(canvas: Canvas, fonts: &FontLibrary) -> image::RgbaImage {
    match render_placeholder_svg(canvas, fonts.fontdb()) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(error = %e, "placeholder svg failed, using plain canvas");
            plain_canvas(canvas)
        }
    }
}

fn plain_canvas(canvas: Canvas) -> image::RgbaImage {
    let [r, g, b] = FALLBACK_BACKGROUND;
    image::RgbaImage::from_pixel(canvas.width, canvas.height, image::Rgba([r, g, b, 255]))
}

fn placeholder_svg(canvas: Canvas) -> String {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let size = (w.min(h) / 16.0).max(1.0);
    let line_gap = size * 1.3;
    let first_baseline = h / 2.0 - line_gap / 2.0 + size * 0.35;
    let [r, g, b] = FALLBACK_BACKGROUND;

    let mut lines = String::new();
    for (i, line) in FALLBACK_CAPTION.iter().enumerate() {
        let y = first_baseline + line_gap * i as f64;
        lines.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="{size:.1}" text-anchor="middle" fill="black">{line}</text>"#,
            x = w / 2.0,
        ));
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{cw}" height="{ch}" viewBox="0 0 {cw} {ch}"><rect width="{cw}" height="{ch}" fill="rgb({r},{g},{b})"/>{lines}</svg>"#,
        cw = canvas.width,
        ch = canvas.height,
    )
}

fn render_placeholder_svg(
    canvas: Canvas,
    fontdb: Arc<usvg::fontdb::Database>,
) -> ComicResult<image::RgbaImage> {
    let svg = placeholder_svg(canvas);
    let opts = usvg::Options {
        fontdb,
        font_resolver: svg_font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse placeholder svg")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| ComicError::validation("failed to allocate placeholder pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    premul_to_image(canvas.width, canvas.height, pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/image/fallback.rs"]
mod tests;
