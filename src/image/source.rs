use std::{panic::AssertUnwindSafe, path::Path};

use crate::{
    foundation::{
        core::Canvas,
        error::{ComicError, ComicResult},
    },
    image::{
        engine::ImageEngine,
        fallback::fallback_image,
        panel::Panel,
        prompt::shape_prompt,
    },
    render::fonts::FontLibrary,
};

/// Turns prompts into fixed-size panels, never surfacing engine failures.
///
/// [`ImageSource::render`] cannot fail: when the engine errors, the deterministic placeholder
/// from [`fallback_image`] is returned instead and the panel is marked
/// [`PanelOrigin::Fallback`](crate::PanelOrigin::Fallback). Engine images of the wrong size are
/// resized to the configured canvas.
pub struct ImageSource {
    engine: Box<dyn ImageEngine>,
    canvas: Canvas,
    fonts: FontLibrary,
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("engine", &self.engine.name())
            .field("canvas", &self.canvas)
            .finish()
    }
}

impl ImageSource {
    /// Wrap `engine`, producing canonical 512x512 panels.
    pub fn new(engine: impl ImageEngine + 'static, fonts: FontLibrary) -> Self {
        Self {
            engine: Box::new(engine),
            canvas: Canvas::PANEL,
            fonts,
        }
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Render a panel for `prompt`. Always succeeds.
    pub fn render(&self, prompt: &str) -> Panel {
        let shaped = shape_prompt(prompt);
        tracing::debug!(engine = self.engine.name(), prompt = %shaped, "rendering panel");

        let rendered = self
            .render_engine(&shaped)
            .and_then(|img| self.fit_to_canvas(img));
        match rendered {
            Ok(img) => Panel::new(img),
            Err(e) => {
                tracing::warn!(
                    engine = self.engine.name(),
                    error = %e,
                    "image generation failed, substituting placeholder"
                );
                Panel::fallback(fallback_image(self.canvas, &self.fonts), e.to_string())
            }
        }
    }

    /// Render a panel for `prompt` and write it to `destination`.
    ///
    /// Engine failures never surface here; the only error is a failed write.
    pub fn generate_image(&self, prompt: &str, destination: &Path) -> ComicResult<Panel> {
        let panel = self.render(prompt);
        panel.save(destination)?;
        Ok(panel)
    }

    /// Run the engine, turning a panic into an engine failure.
    fn render_engine(&self, prompt: &str) -> ComicResult<image::RgbaImage> {
        std::panic::catch_unwind(AssertUnwindSafe(|| self.engine.render(prompt, self.canvas)))
            .unwrap_or_else(|payload| {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                Err(ComicError::image(format!("engine panicked: {msg}")))
            })
    }

    fn fit_to_canvas(&self, img: image::RgbaImage) -> ComicResult<image::RgbaImage> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(ComicError::image("engine returned an empty image"));
        }
        if (w, h) == (self.canvas.width, self.canvas.height) {
            return Ok(img);
        }
        tracing::debug!(
            from_w = w,
            from_h = h,
            to_w = self.canvas.width,
            to_h = self.canvas.height,
            "resizing engine output"
        );
        Ok(image::imageops::resize(
            &img,
            self.canvas.width,
            self.canvas.height,
            image::imageops::FilterType::Lanczos3,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/source.rs"]
mod tests;
