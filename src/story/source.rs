use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    external::ExternalCommand,
    foundation::error::{ComicError, ComicResult},
    foundation::math::{SeedStream, fnv1a64_str},
    story::model::{Section, Story, Theme},
    story::parse::parse_story,
};

/// Produces the four-beat [`Story`] for a theme.
///
/// Failures are fatal to a pipeline run; there is no fallback story.
pub trait StorySource: Send + Sync {
    fn generate_story(&self, theme: &Theme) -> ComicResult<Story>;
}

impl<T: StorySource + ?Sized> StorySource for Box<T> {
    fn generate_story(&self, theme: &Theme) -> ComicResult<Story> {
        (**self).generate_story(theme)
    }
}

/// Instruction block handed to text generators.
pub fn story_prompt(theme: &Theme) -> String {
    format!(
        "Create a comic story with:\n\
         {}: {theme}\n\
         {}: Develop the narrative\n\
         {}: Exciting conclusion\n\
         {}: Lesson learned\n\
         \n\
         Keep each section 2-3 sentences.",
        Section::Introduction.marker(),
        Section::Storyline.marker(),
        Section::Climax.marker(),
        Section::Moral.marker(),
    )
}

/// Returns the same story for every theme.
#[derive(Clone, Debug)]
pub struct StaticStorySource {
    story: Story,
}

impl StaticStorySource {
    pub fn new(story: Story) -> Self {
        Self { story }
    }

    /// Load a structured story (`{"introduction": ..., "moral": ...}`) from JSON.
    pub fn from_json_path(path: &Path) -> ComicResult<Self> {
        let f = File::open(path).with_context(|| format!("open story '{}'", path.display()))?;
        let story: Story = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse story JSON '{}'", path.display()))?;
        Ok(Self { story })
    }
}

impl StorySource for StaticStorySource {
    fn generate_story(&self, _theme: &Theme) -> ComicResult<Story> {
        Ok(self.story.clone())
    }
}

/// Runs an external text generator and parses its numbered-section output.
///
/// Arguments may reference `{prompt}` and `{theme}`; the prompt is also written to stdin.
#[derive(Clone, Debug)]
pub struct CommandStorySource {
    command: ExternalCommand,
}

impl CommandStorySource {
    pub fn new(command: ExternalCommand) -> Self {
        Self { command }
    }
}

impl StorySource for CommandStorySource {
    #[tracing::instrument(skip(self), fields(program = %self.command.program))]
    fn generate_story(&self, theme: &Theme) -> ComicResult<Story> {
        let prompt = story_prompt(theme);
        let stdout = self
            .command
            .run(
                &[("prompt", prompt.as_str()), ("theme", theme.as_str())],
                Some(&prompt),
            )
            .map_err(|e| ComicError::story(format!("{e:#}")))?;
        let text = String::from_utf8(stdout)
            .map_err(|e| ComicError::story(format!("generator output is not UTF-8: {e}")))?;

        let story = parse_story(&text);
        for (section, body) in story.sections() {
            if body.is_empty() {
                tracing::warn!(section = section.key(), "generator produced no text for section");
            }
        }
        Ok(story)
    }
}

/// Offline story generator built from phrase templates, seeded by the theme.
///
/// Renders numbered free-form text and runs it through [`parse_story`], the same path
/// generator output takes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateStorySource;

const INTRODUCTIONS: &[&str] = &[
    "Our story begins with {theme}. Nobody in town suspects what is about to happen.",
    "Meet the star of {theme}. It is an ordinary morning, but not for long.",
    "Everything starts quietly: {theme}. A strange sign appears on the horizon.",
];

const STORYLINES: &[&str] = &[
    "Trouble arrives and the plan falls apart. Friends and rivals get pulled into the chaos.",
    "A mysterious clue leads deeper into the adventure. Each step raises the stakes.",
    "An unlikely ally joins the quest. Together they face obstacle after obstacle.",
];

const CLIMAXES: &[&str] = &[
    "At the last possible moment, courage wins the day. The crowd erupts in cheers.",
    "Everything comes down to one daring leap. The gamble pays off spectacularly.",
    "The final showdown shakes the whole city. When the dust settles, the hero stands tall.",
];

const MORALS: &[&str] = &[
    "Bravery is not the absence of fear, but acting in spite of it.",
    "Teamwork turns the impossible into the inevitable.",
    "Even the smallest hero can make the biggest difference.",
];

impl TemplateStorySource {
    /// The raw numbered text this source would hand to the parser.
    pub fn render_text(&self, theme: &Theme) -> String {
        let mut seed = SeedStream::new(fnv1a64_str(theme.as_str()));
        let mut out = String::new();
        for (section, options) in [
            (Section::Introduction, INTRODUCTIONS),
            (Section::Storyline, STORYLINES),
            (Section::Climax, CLIMAXES),
            (Section::Moral, MORALS),
        ] {
            let line = seed.pick(options).copied().unwrap_or_default();
            out.push_str(section.marker());
            out.push_str(": ");
            out.push_str(&line.replace("{theme}", theme.as_str()));
            out.push('\n');
        }
        out
    }
}

impl StorySource for TemplateStorySource {
    fn generate_story(&self, theme: &Theme) -> ComicResult<Story> {
        Ok(parse_story(&self.render_text(theme)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/source.rs"]
mod tests;
