use super::*;

#[test]
fn parses_all_four_sections_with_continuation_lines() {
    let text = "\
Here is your comic story.

1. Introduction: A squirrel gains powers.
It found a glowing acorn.
2. Storyline: The squirrel battles villains.
3. Climax: Final showdown at the park.
   The crows retreat.

4. Moral: Bravery matters.
";
    let story = parse_story(text);
    assert_eq!(
        story.get(Section::Introduction),
        "A squirrel gains powers. It found a glowing acorn."
    );
    assert_eq!(story.get(Section::Storyline), "The squirrel battles villains.");
    assert_eq!(
        story.get(Section::Climax),
        "Final showdown at the park. The crows retreat."
    );
    assert_eq!(story.get(Section::Moral), "Bravery matters.");
}

#[test]
fn missing_header_leaves_section_empty() {
    let text = "1. Introduction: Start.\n3. Climax: Boom.\n4. Moral: Done.";
    let story = parse_story(text);
    assert_eq!(story.get(Section::Introduction), "Start.");
    assert_eq!(story.get(Section::Storyline), "");
    assert_eq!(story.get(Section::Climax), "Boom.");
    assert_eq!(story.get(Section::Moral), "Done.");
}

#[test]
fn lines_before_first_header_are_dropped() {
    let story = parse_story("preamble\nmore preamble\n2. Storyline: Middle.");
    assert_eq!(story.get(Section::Introduction), "");
    assert_eq!(story.get(Section::Storyline), "Middle.");
}

#[test]
fn repeated_header_replaces_earlier_content() {
    // Generators often echo the prompt before answering it.
    let text = "\
1. Introduction: Robot detective in Paris
2. Storyline: Develop the narrative
1. Introduction: A robot sniffs out clues.
2. Storyline: It chases a thief.
";
    let story = parse_story(text);
    assert_eq!(story.get(Section::Introduction), "A robot sniffs out clues.");
    assert_eq!(story.get(Section::Storyline), "It chases a thief.");
}

#[test]
fn header_without_colon_opens_empty_section() {
    let story = parse_story("4. Moral\nBe kind.\nAlways.");
    assert_eq!(story.get(Section::Moral), "Be kind. Always.");
}

#[test]
fn only_first_colon_splits_header_content() {
    let story = parse_story("3. Climax: Time: midnight.");
    assert_eq!(story.get(Section::Climax), "Time: midnight.");
}

#[test]
fn marker_may_appear_inside_a_decorated_line() {
    let story = parse_story("**1. Introduction**: Bold start.");
    assert_eq!(story.get(Section::Introduction), "Bold start.");
}

#[test]
fn empty_input_is_a_blank_story() {
    assert!(parse_story("").is_blank());
}
