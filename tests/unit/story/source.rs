use std::path::PathBuf;

use super::*;

fn theme(s: &str) -> Theme {
    Theme::new(s).unwrap()
}

#[test]
fn prompt_lists_all_markers_and_the_theme() {
    let p = story_prompt(&theme("Robot detective in Paris"));
    for s in Section::ALL {
        assert!(p.contains(s.marker()), "missing {}", s.marker());
    }
    assert!(p.contains("1. Introduction: Robot detective in Paris"));
    assert!(p.contains("Keep each section 2-3 sentences."));
}

#[test]
fn template_source_fills_every_section_deterministically() {
    let src = TemplateStorySource;
    let t = theme("Superhero squirrel saves the day");
    let a = src.generate_story(&t).unwrap();
    let b = src.generate_story(&t).unwrap();
    assert_eq!(a, b);
    for (section, text) in a.sections() {
        assert!(!text.is_empty(), "{section} is empty");
    }
    assert!(a.get(Section::Introduction).contains("Superhero squirrel saves the day"));
}

#[test]
fn static_source_ignores_theme() {
    let story = Story::new("a", "b", "c", "d");
    let src = StaticStorySource::new(story.clone());
    assert_eq!(src.generate_story(&theme("x")).unwrap(), story);
    assert_eq!(src.generate_story(&theme("y")).unwrap(), story);
}

#[test]
fn static_source_loads_structured_json() {
    let dir = PathBuf::from("target").join("unit_story_source");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("story.json");
    std::fs::write(
        &path,
        r#"{"introduction":"A squirrel gains powers.","storyline":"It trains.","climax":"It wins.","moral":"Be brave."}"#,
    )
    .unwrap();

    let src = StaticStorySource::from_json_path(&path).unwrap();
    let story = src.generate_story(&theme("ignored")).unwrap();
    assert_eq!(story.get(Section::Climax), "It wins.");
}

#[test]
fn static_source_missing_file_is_an_error() {
    let path = PathBuf::from("target").join("unit_story_source").join("nope.json");
    assert!(StaticStorySource::from_json_path(&path).is_err());
}

#[test]
fn command_source_failure_is_a_story_generation_error() {
    let src = CommandStorySource::new(ExternalCommand::new(
        "comicraft-definitely-not-a-real-program",
        vec![],
    ));
    let err = src.generate_story(&theme("x")).unwrap_err();
    assert!(matches!(err, ComicError::StoryGeneration(_)));
}

#[cfg(unix)]
#[test]
fn command_source_parses_generator_stdout() {
    let script = "printf '1. Introduction: Hi.\\n2. Storyline: Mid.\\nmore\\n4. Moral: End.\\n'";
    let src = CommandStorySource::new(ExternalCommand::new(
        "sh",
        vec!["-c".to_string(), script.to_string()],
    ));
    let story = src.generate_story(&theme("x")).unwrap();
    assert_eq!(story.get(Section::Introduction), "Hi.");
    assert_eq!(story.get(Section::Storyline), "Mid. more");
    assert_eq!(story.get(Section::Climax), "");
    assert_eq!(story.get(Section::Moral), "End.");
}
