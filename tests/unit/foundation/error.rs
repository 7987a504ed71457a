use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ComicError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ComicError::story("x")
            .to_string()
            .contains("story generation error:")
    );
    assert!(
        ComicError::image("x")
            .to_string()
            .contains("image generation error:")
    );
    assert_eq!(ComicError::EmptyPanelSet.to_string(), "no panels to combine");
}

#[test]
fn filesystem_error_names_path_and_keeps_source() {
    let err = ComicError::filesystem("out/final_comic.png", std::io::Error::other("disk full"));
    let msg = err.to_string();
    assert!(msg.contains("out/final_comic.png"));
    assert!(msg.contains("disk full"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ComicError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_image_generation_is_recoverable() {
    assert!(!ComicError::image("engine down").is_fatal());
    assert!(ComicError::story("no model").is_fatal());
    assert!(ComicError::EmptyPanelSet.is_fatal());
    assert!(ComicError::validation("bad").is_fatal());
}
