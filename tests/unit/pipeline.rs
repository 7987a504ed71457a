use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::{
    image::engine::{FallbackOnlyEngine, ImageEngine, ProceduralEngine},
    output::{STRIP_FILE_NAME, panel_file_name},
    render::fonts::FontLibrary,
    story::source::StaticStorySource,
};

struct FailingStory;

impl StorySource for FailingStory {
    fn generate_story(&self, _theme: &Theme) -> ComicResult<Story> {
        Err(ComicError::story("model unavailable"))
    }
}

struct FlakyEngine {
    calls: Arc<AtomicUsize>,
}

impl ImageEngine for FlakyEngine {
    fn name(&self) -> &str {
        "flaky"
    }

    fn render(&self, prompt: &str, canvas: crate::Canvas) -> ComicResult<image::RgbaImage> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n % 2 == 1 {
            return Err(ComicError::image(format!("flaked on '{prompt}'")));
        }
        ProceduralEngine.render(prompt, canvas)
    }
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_pipeline").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn story() -> Story {
    Story::new(
        "A squirrel finds a cape.",
        "It learns to glide between rooftops.",
        "It catches a falling kite before it hits the crowd.",
        "Courage grows with practice.",
    )
}

fn pipeline(engine: impl ImageEngine + 'static) -> ComicPipeline {
    ComicPipeline::new(
        StaticStorySource::new(story()),
        ImageSource::new(engine, FontLibrary::empty()),
        PanelAnnotator::without_text(),
    )
}

fn theme() -> Theme {
    Theme::new("Superhero squirrel saves the day").unwrap()
}

#[test]
fn creates_four_panels_and_a_strip() {
    let dir = scratch("e2e");
    let run = pipeline(ProceduralEngine).run(&theme(), &dir).unwrap();

    assert_eq!(run.strip_path, dir.join(STRIP_FILE_NAME));
    let strip = image::open(&run.strip_path).unwrap();
    assert_eq!((strip.width(), strip.height()), (512, 2048));

    let sections: Vec<Section> = run.panels.iter().map(|p| p.section).collect();
    assert_eq!(sections, Section::ALL.to_vec());
    for (file, section) in run.panels.iter().zip(Section::ALL) {
        assert_eq!(file.path, dir.join(panel_file_name(section)));
        assert_eq!(file.origin, PanelOrigin::Engine);
        let img = image::open(&file.path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (512, 512));
    }

    let mut pngs: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    pngs.sort();
    assert_eq!(
        pngs,
        vec![
            "final_comic.png",
            "panel_climax.png",
            "panel_introduction.png",
            "panel_moral.png",
            "panel_storyline.png",
        ]
    );
    assert_eq!(run.story, story());
    assert_eq!(run.fallback_count(), 0);
}

#[test]
fn saved_panels_carry_the_caption_band() {
    let dir = scratch("band");
    let run = pipeline(FallbackOnlyEngine).run(&theme(), &dir).unwrap();
    let img = image::open(&run.panels[0].path).unwrap().to_rgba8();
    // placeholder background (255, 253, 245) under a half-black band
    assert_eq!(img.get_pixel(256, 50).0, [127, 126, 122, 255]);
    assert_eq!(img.get_pixel(256, 200).0, [255, 253, 245, 255]);
}

#[test]
fn saved_panels_carry_white_caption_text() {
    let font = FontLibrary::system()
        .caption_font()
        .expect("caption rendering needs at least one system font");
    let dir = scratch("caption");
    let p = ComicPipeline::new(
        StaticStorySource::new(story()),
        ImageSource::new(FallbackOnlyEngine, FontLibrary::empty()),
        PanelAnnotator::new(Some(font)),
    );
    p.run(&theme(), &dir).unwrap();

    let img = image::open(dir.join(panel_file_name(Section::Introduction)))
        .unwrap()
        .to_rgba8();
    let white = (10..=100u32)
        .flat_map(|y| (20..=502u32).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0.iter().take(3).all(|&c| c > 200))
        .count();
    assert!(white > 20, "caption text missing ({white} white pixels in band)");
    // band without glyphs, and untouched placeholder below the band
    assert_eq!(img.get_pixel(500, 95).0, [127, 126, 122, 255]);
    assert_eq!(img.get_pixel(256, 300).0, [255, 253, 245, 255]);
}

#[test]
fn story_failure_writes_no_images() {
    let dir = scratch("story_fail");
    let p = ComicPipeline::new(
        FailingStory,
        ImageSource::new(ProceduralEngine, FontLibrary::empty()),
        PanelAnnotator::without_text(),
    );
    let err = p.create_comic(&theme(), &dir).unwrap_err();
    assert!(matches!(err, ComicError::StoryGeneration(_)));
    assert!(dir.is_dir());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn engine_failures_fall_back_and_still_compose() {
    let dir = scratch("fallback");
    let calls = Arc::new(AtomicUsize::new(0));
    let run = pipeline(FlakyEngine {
        calls: calls.clone(),
    })
    .run(&theme(), &dir)
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(run.fallback_count(), 2);
    assert!(matches!(run.panels[1].origin, PanelOrigin::Fallback { .. }));
    let strip = image::open(&run.strip_path).unwrap();
    assert_eq!((strip.width(), strip.height()), (512, 2048));
}

#[test]
fn parallel_run_matches_sequential_output() {
    let seq_dir = scratch("seq");
    let par_dir = scratch("par");
    let seq = pipeline(ProceduralEngine).run(&theme(), &seq_dir).unwrap();
    let par = pipeline(ProceduralEngine)
        .with_opts(PipelineOpts {
            parallel: true,
            threads: Some(2),
        })
        .run(&theme(), &par_dir)
        .unwrap();

    let a = image::open(&seq.strip_path).unwrap().to_rgb8();
    let b = image::open(&par.strip_path).unwrap().to_rgb8();
    assert_eq!(a.dimensions(), b.dimensions());
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn zero_threads_is_rejected_before_any_work() {
    let dir = scratch("zero_threads");
    let err = pipeline(ProceduralEngine)
        .with_opts(PipelineOpts {
            parallel: true,
            threads: Some(0),
        })
        .run(&theme(), &dir)
        .unwrap_err();
    assert!(matches!(err, ComicError::Validation(_)));
    assert!(!dir.exists());
}

#[test]
fn existing_output_dir_is_reused() {
    let dir = scratch("reuse");
    let p = pipeline(ProceduralEngine);
    p.create_comic(&theme(), &dir).unwrap();
    let strip = p.create_comic(&theme(), &dir).unwrap();
    assert!(strip.is_file());
}
