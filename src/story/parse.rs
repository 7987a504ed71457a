use crate::story::model::{Section, Story};

/// Parse free-form generator output into a [`Story`].
///
/// Lines are trimmed and blank lines skipped. A line containing a section marker (checked in
/// story order) opens that section and replaces its content with the text after the first `:`.
/// Other lines are appended to the open section with a single space. Lines before the first
/// marker are dropped, and sections that never appear stay empty.
pub fn parse_story(text: &str) -> Story {
    let mut story = Story::default();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(section) = header_section(line) {
            let content = line
                .split_once(':')
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default();
            *story.slot_mut(section) = content.to_string();
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            continue;
        };
        let slot = story.slot_mut(section);
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(line);
    }

    story
}

fn header_section(line: &str) -> Option<Section> {
    Section::ALL.into_iter().find(|s| line.contains(s.marker()))
}

#[cfg(test)]
#[path = "../../tests/unit/story/parse.rs"]
mod tests;
