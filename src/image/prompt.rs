/// Maximum number of characters of caller text kept in an image prompt.
pub const PROMPT_PREFIX_CHARS: usize = 100;

/// Style keywords appended to every image prompt so panels look alike.
pub const STYLE_KEYWORDS: [&str; 4] = [
    "comic book style",
    "clear outlines",
    "vibrant colors",
    "white background",
];

/// Prompt the pipeline hands to the image source for one story section.
pub fn panel_prompt(section_text: &str) -> String {
    format!("Comic panel, clear outlines, vibrant colors: {section_text}")
}

/// Truncate `prompt` to [`PROMPT_PREFIX_CHARS`] characters and append [`STYLE_KEYWORDS`].
pub fn shape_prompt(prompt: &str) -> String {
    let prefix: String = prompt.chars().take(PROMPT_PREFIX_CHARS).collect();
    format!("{prefix}, {}", STYLE_KEYWORDS.join(", "))
}

#[cfg(test)]
#[path = "../../tests/unit/image/prompt.rs"]
mod tests;
