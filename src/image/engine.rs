use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use vello_cpu::kurbo::Shape as _;

use crate::{
    external::ExternalCommand,
    foundation::{
        core::Canvas,
        error::{ComicError, ComicResult},
        math::{SeedStream, fnv1a64_str},
    },
    render::composite::premul_to_image,
};

/// A text-to-image generator. Implementations may fail; [`crate::ImageSource`] absorbs failures,
/// panics included.
pub trait ImageEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Render `prompt` into an image, ideally of size `canvas`.
    fn render(&self, prompt: &str, canvas: Canvas) -> ComicResult<image::RgbaImage>;
}

impl<T: ImageEngine + ?Sized> ImageEngine for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&self, prompt: &str, canvas: Canvas) -> ComicResult<image::RgbaImage> {
        (**self).render(prompt, canvas)
    }
}

/// Engine that always fails, so every panel becomes the placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackOnlyEngine;

impl ImageEngine for FallbackOnlyEngine {
    fn name(&self) -> &str {
        "fallback-only"
    }

    fn render(&self, _prompt: &str, _canvas: Canvas) -> ComicResult<image::RgbaImage> {
        Err(ComicError::image("fallback-only engine renders no images"))
    }
}

const PALETTE: [[u8; 3]; 8] = [
    [239, 71, 111],
    [255, 209, 102],
    [6, 214, 160],
    [17, 138, 178],
    [255, 127, 80],
    [155, 93, 229],
    [241, 91, 181],
    [0, 187, 249],
];

const OUTLINE: [u8; 3] = [24, 24, 32];

/// Offline engine drawing flat, outlined comic shapes seeded by the prompt.
///
/// The same prompt always yields the same pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProceduralEngine;

impl ImageEngine for ProceduralEngine {
    fn name(&self) -> &str {
        "procedural"
    }

    fn render(&self, prompt: &str, canvas: Canvas) -> ComicResult<image::RgbaImage> {
        let (w, h) = canvas.as_u16()?;
        let (wf, hf) = (f64::from(w), f64::from(h));
        let mut rng = SeedStream::new(fnv1a64_str(prompt));
        let mut ctx = vello_cpu::RenderContext::new(w, h);

        let fill = |ctx: &mut vello_cpu::RenderContext, [r, g, b]: [u8; 3], a: u8| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        };

        fill(&mut ctx, [255, 255, 255], 255);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, wf, hf));

        let sky = *rng.pick(&PALETTE).unwrap_or(&PALETTE[0]);
        fill(&mut ctx, sky, 70);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, wf, hf * 0.7));

        let ground_top = hf * rng.range_f64(0.68, 0.8);
        fill(&mut ctx, OUTLINE, 255);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, ground_top - 4.0, wf, hf));
        let ground = *rng.pick(&PALETTE).unwrap_or(&PALETTE[1]);
        fill(&mut ctx, ground, 255);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, ground_top, wf, hf));

        let unit = wf.min(hf);
        let shapes = 3 + (rng.next_u64() % 4) as usize;
        for _ in 0..shapes {
            let r = unit * rng.range_f64(0.05, 0.16);
            let cx = rng.range_f64(r, wf - r);
            let cy = rng.range_f64(r, ground_top.max(r + 1.0));
            let color = *rng.pick(&PALETTE).unwrap_or(&PALETTE[2]);

            let outline = vello_cpu::kurbo::Circle::new((cx, cy), r + unit * 0.01);
            fill(&mut ctx, OUTLINE, 255);
            ctx.fill_path(&outline.to_path(0.1));

            let body = vello_cpu::kurbo::Circle::new((cx, cy), r);
            fill(&mut ctx, color, 255);
            ctx.fill_path(&body.to_path(0.1));

            let shine = vello_cpu::kurbo::Circle::new((cx - r * 0.35, cy - r * 0.35), r * 0.2);
            fill(&mut ctx, [255, 255, 255], 200);
            ctx.fill_path(&shine.to_path(0.1));
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let mut img =
            premul_to_image(canvas.width, canvas.height, pixmap.data_as_u8_slice().to_vec())?;
        // The opaque backdrop covers every pixel; edge rounding can still leave alpha at 254.
        for px in img.pixels_mut() {
            px.0[3] = 255;
        }
        Ok(img)
    }
}

/// Runs an external image generator that writes a PNG.
///
/// Arguments may reference `{prompt}`, `{out}`, `{width}` and `{height}`. The program must write
/// its image to `{out}`; the file is removed after decoding.
#[derive(Debug)]
pub struct CommandEngine {
    command: ExternalCommand,
    scratch_dir: PathBuf,
    next_id: AtomicU64,
}

impl CommandEngine {
    pub fn new(command: ExternalCommand) -> Self {
        Self {
            command,
            scratch_dir: std::env::temp_dir(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Directory for the generator's intermediate PNGs (defaults to the system temp dir).
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    fn scratch_path(&self) -> PathBuf {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir
            .join(format!("comicraft-{}-{id}.png", std::process::id()))
    }
}

struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

impl ImageEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn render(&self, prompt: &str, canvas: Canvas) -> ComicResult<image::RgbaImage> {
        let scratch = ScratchFile(self.scratch_path());
        let out = scratch.0.to_string_lossy().into_owned();
        let (width, height) = (canvas.width.to_string(), canvas.height.to_string());

        self.command
            .run(
                &[
                    ("prompt", prompt),
                    ("out", out.as_str()),
                    ("width", width.as_str()),
                    ("height", height.as_str()),
                ],
                None,
            )
            .map_err(|e| ComicError::image(format!("{e:#}")))?;

        let img = image::open(&scratch.0)
            .map_err(|e| ComicError::image(format!("decode generator output '{out}': {e}")))?;
        Ok(img.to_rgba8())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/engine.rs"]
mod tests;
