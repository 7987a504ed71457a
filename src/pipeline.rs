use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use rayon::prelude::*;

use crate::{
    annotate::PanelAnnotator,
    compose::compose,
    foundation::error::{ComicError, ComicResult},
    image::{
        panel::{Panel, PanelOrigin},
        prompt::panel_prompt,
        source::ImageSource,
    },
    output::OutputDir,
    story::{
        model::{Section, Story, Theme},
        source::StorySource,
    },
};

/// How panel generation is scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PipelineOpts {
    /// Generate the four panels on a dedicated rayon pool.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl PipelineOpts {
    pub fn validate(&self) -> ComicResult<()> {
        if self.threads == Some(0) {
            return Err(ComicError::validation(
                "pipeline 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// One panel file written by a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelFile {
    pub section: Section,
    pub path: PathBuf,
    pub origin: PanelOrigin,
}

/// Everything a successful run produced.
#[derive(Clone, Debug)]
pub struct ComicRun {
    pub theme: Theme,
    pub story: Story,
    /// Annotated panels in story order.
    pub panels: Vec<PanelFile>,
    pub strip_path: PathBuf,
    pub elapsed: Duration,
}

impl ComicRun {
    pub fn fallback_count(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| matches!(p.origin, PanelOrigin::Fallback { .. }))
            .count()
    }
}

/// Theme in, four captioned panels and a vertical strip out.
///
/// Stages:
/// 1. [`StorySource::generate_story`] once per run
/// 2. per section: [`ImageSource::generate_image`], [`PanelAnnotator::annotate`], re-save
/// 3. [`compose`] into `final_comic.png`
///
/// A story failure aborts the run before any image is written. Engine failures never abort it.
pub struct ComicPipeline {
    story: Box<dyn StorySource>,
    images: ImageSource,
    annotator: PanelAnnotator,
    opts: PipelineOpts,
}

impl std::fmt::Debug for ComicPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComicPipeline")
            .field("images", &self.images)
            .field("annotator", &self.annotator)
            .field("opts", &self.opts)
            .finish()
    }
}

impl ComicPipeline {
    pub fn new(
        story: impl StorySource + 'static,
        images: ImageSource,
        annotator: PanelAnnotator,
    ) -> Self {
        Self {
            story: Box::new(story),
            images,
            annotator,
            opts: PipelineOpts::default(),
        }
    }

    pub fn with_opts(mut self, opts: PipelineOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn opts(&self) -> PipelineOpts {
        self.opts
    }

    pub fn images(&self) -> &ImageSource {
        &self.images
    }

    pub fn annotator(&self) -> &PanelAnnotator {
        &self.annotator
    }

    /// Run the pipeline and return the path of the composed strip.
    #[tracing::instrument(skip_all, fields(theme = %theme, out = %output_dir.display()))]
    pub fn create_comic(&self, theme: &Theme, output_dir: &Path) -> ComicResult<PathBuf> {
        self.run(theme, output_dir).map(|run| run.strip_path)
    }

    /// Run the pipeline and report every artifact it wrote.
    #[tracing::instrument(skip_all, fields(theme = %theme, out = %output_dir.display()))]
    pub fn run(&self, theme: &Theme, output_dir: &Path) -> ComicResult<ComicRun> {
        self.opts.validate()?;
        let started = Instant::now();

        let out = OutputDir::new(output_dir);
        out.ensure()?;

        let story = self.story.generate_story(theme)?;
        tracing::info!(blank = story.is_blank(), "story generated");

        let generated = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                Section::ALL
                    .par_iter()
                    .map(|&section| self.make_panel(&out, &story, section))
                    .collect::<ComicResult<Vec<_>>>()
            })?
        } else {
            Section::ALL
                .iter()
                .map(|&section| self.make_panel(&out, &story, section))
                .collect::<ComicResult<Vec<_>>>()?
        };

        let (panels, files): (Vec<Panel>, Vec<PanelFile>) = generated.into_iter().unzip();
        let strip_path = compose(&panels, &out.strip_path())?;

        let elapsed = started.elapsed();
        tracing::info!(
            strip = %strip_path.display(),
            elapsed_secs = elapsed.as_secs_f64(),
            "comic created"
        );

        Ok(ComicRun {
            theme: theme.clone(),
            story,
            panels: files,
            strip_path,
            elapsed,
        })
    }

    fn make_panel(
        &self,
        out: &OutputDir,
        story: &Story,
        section: Section,
    ) -> ComicResult<(Panel, PanelFile)> {
        let path = out.panel_path(section);
        let text = story.get(section);

        let mut panel = self.images.generate_image(&panel_prompt(text), &path)?;
        self.annotator.annotate(&mut panel, text);
        panel.save(&path)?;

        tracing::info!(
            section = %section,
            path = %path.display(),
            fallback = panel.is_fallback(),
            "panel generated"
        );

        let file = PanelFile {
            section,
            path,
            origin: panel.origin().clone(),
        };
        Ok((panel, file))
    }
}

/// Callers validate `threads` through [`PipelineOpts::validate`] first.
fn build_thread_pool(threads: Option<usize>) -> ComicResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
