use super::*;

#[test]
fn short_prompts_are_kept_whole() {
    assert_eq!(
        shape_prompt("a cat"),
        "a cat, comic book style, clear outlines, vibrant colors, white background"
    );
}

#[test]
fn long_prompts_are_cut_to_the_prefix_length() {
    let long = "x".repeat(250);
    let shaped = shape_prompt(&long);
    assert!(shaped.starts_with(&"x".repeat(PROMPT_PREFIX_CHARS)));
    assert!(!shaped.starts_with(&"x".repeat(PROMPT_PREFIX_CHARS + 1)));
    assert!(shaped.ends_with("white background"));
}

#[test]
fn truncation_counts_characters_not_bytes() {
    let long = "é".repeat(150);
    let shaped = shape_prompt(&long);
    let prefix = shaped.split(", comic book style").next().unwrap();
    assert_eq!(prefix.chars().count(), PROMPT_PREFIX_CHARS);
}

#[test]
fn panel_prompt_wraps_section_text() {
    assert_eq!(
        panel_prompt("Final showdown at the park."),
        "Comic panel, clear outlines, vibrant colors: Final showdown at the park."
    );
}
