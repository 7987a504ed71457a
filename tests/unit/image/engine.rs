use super::*;

#[test]
fn fallback_only_engine_always_fails() {
    let err = FallbackOnlyEngine
        .render("anything", Canvas::PANEL)
        .unwrap_err();
    assert!(matches!(err, ComicError::ImageGeneration(_)));
}

#[test]
fn procedural_engine_is_deterministic_per_prompt() {
    let canvas = Canvas::new(96, 96).unwrap();
    let a = ProceduralEngine.render("a squirrel", canvas).unwrap();
    let b = ProceduralEngine.render("a squirrel", canvas).unwrap();
    let c = ProceduralEngine.render("a robot", canvas).unwrap();
    assert_eq!(a.dimensions(), (96, 96));
    assert_eq!(a.as_raw(), b.as_raw());
    assert_ne!(a.as_raw(), c.as_raw());
    assert!(a.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn procedural_panel_is_fully_opaque_at_panel_size() {
    let img = ProceduralEngine.render("a squirrel in a cape", Canvas::PANEL).unwrap();
    let translucent = img.pixels().filter(|p| p.0[3] != 255).count();
    assert_eq!(translucent, 0);
}

#[test]
fn command_engine_reports_missing_program_as_image_error() {
    let engine = CommandEngine::new(ExternalCommand::new(
        "comicraft-definitely-not-a-real-program",
        vec!["{out}".to_string()],
    ));
    let err = engine.render("x", Canvas::PANEL).unwrap_err();
    assert!(matches!(err, ComicError::ImageGeneration(_)));
}

#[cfg(unix)]
#[test]
fn command_engine_that_writes_nothing_is_an_image_error() {
    let engine = CommandEngine::new(ExternalCommand::new("true", vec!["{out}".to_string()]))
        .with_scratch_dir(std::env::temp_dir());
    let err = engine.render("x", Canvas::PANEL).unwrap_err();
    assert!(err.to_string().contains("decode generator output"));
}

#[cfg(unix)]
#[test]
fn command_engine_reads_the_png_written_to_out() {
    let dir = PathBuf::from("target").join("unit_command_engine");
    std::fs::create_dir_all(&dir).unwrap();
    let source = dir.join("source.png");
    image::RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255]))
        .save(&source)
        .unwrap();

    let engine = CommandEngine::new(ExternalCommand::new(
        "cp",
        vec![source.to_string_lossy().into_owned(), "{out}".to_string()],
    ))
    .with_scratch_dir(&dir);
    let img = engine.render("x", Canvas::PANEL).unwrap();
    assert_eq!(img.dimensions(), (8, 4));
    assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);

    let leftovers = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("comicraft-"))
        .count();
    assert_eq!(leftovers, 0);
}
