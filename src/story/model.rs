use crate::foundation::error::{ComicError, ComicResult};

/// Theme used when the caller provides none.
pub const DEFAULT_THEME: &str = "Superhero squirrel saves the day";

/// A non-empty, trimmed comic theme.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Theme(String);

impl Theme {
    /// Validate `text` as a theme. Empty or whitespace-only input is rejected.
    pub fn new(text: impl AsRef<str>) -> ComicResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ComicError::validation("theme must be non-empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Boundary helper: empty input falls back to [`DEFAULT_THEME`].
    pub fn or_default(text: impl AsRef<str>) -> Self {
        Self::new(text).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self(DEFAULT_THEME.to_string())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Theme {
    type Error = ComicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Theme> for String {
    fn from(value: Theme) -> Self {
        value.0
    }
}

/// One of the four fixed narrative beats. Declaration order is panel order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Introduction,
    Storyline,
    Climax,
    Moral,
}

impl Section {
    /// All sections in story order.
    pub const ALL: [Section; 4] = [
        Section::Introduction,
        Section::Storyline,
        Section::Climax,
        Section::Moral,
    ];

    /// Stable lowercase key, used in file names and JSON.
    pub fn key(self) -> &'static str {
        match self {
            Section::Introduction => "introduction",
            Section::Storyline => "storyline",
            Section::Climax => "climax",
            Section::Moral => "moral",
        }
    }

    /// Literal header marker recognized in free-form story text.
    pub fn marker(self) -> &'static str {
        match self {
            Section::Introduction => "1. Introduction",
            Section::Storyline => "2. Storyline",
            Section::Climax => "3. Climax",
            Section::Moral => "4. Moral",
        }
    }

    /// Human-readable title ("Introduction", ...).
    pub fn title(self) -> &'static str {
        match self {
            Section::Introduction => "Introduction",
            Section::Storyline => "Storyline",
            Section::Climax => "Climax",
            Section::Moral => "Moral",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A four-beat story. Sections may be empty when the source could not produce them.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Story {
    #[serde(default)]
    introduction: String,
    #[serde(default)]
    storyline: String,
    #[serde(default)]
    climax: String,
    #[serde(default)]
    moral: String,
}

impl Story {
    pub fn new(
        introduction: impl Into<String>,
        storyline: impl Into<String>,
        climax: impl Into<String>,
        moral: impl Into<String>,
    ) -> Self {
        Self {
            introduction: introduction.into(),
            storyline: storyline.into(),
            climax: climax.into(),
            moral: moral.into(),
        }
    }

    /// Text of one section.
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Introduction => &self.introduction,
            Section::Storyline => &self.storyline,
            Section::Climax => &self.climax,
            Section::Moral => &self.moral,
        }
    }

    /// Sections with their text, in story order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &str)> + '_ {
        Section::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    pub fn is_blank(&self) -> bool {
        self.sections().all(|(_, text)| text.trim().is_empty())
    }

    pub(crate) fn slot_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Introduction => &mut self.introduction,
            Section::Storyline => &mut self.storyline,
            Section::Climax => &mut self.climax,
            Section::Moral => &mut self.moral,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
