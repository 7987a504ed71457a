use std::{
    io::{BufRead as _, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use comicraft::StorySource as _;
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "comicraft", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a full comic: four captioned panels plus the stacked strip.
    Create(CreateArgs),
    /// Generate only the story and print it as JSON.
    Story(StoryArgs),
    /// Generate a single panel image from a prompt.
    Panel(PanelArgs),
    /// Print diagnostics about caption font resolution (family name + SHA-256 of font bytes).
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct CreateArgs {
    /// Comic theme. Prompted for interactively when omitted.
    #[arg(long)]
    theme: Option<String>,

    /// Output directory (overrides the config file).
    #[arg(long)]
    out: Option<PathBuf>,

    /// JSON run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Caption font file (overrides the config file).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Generate panels in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct StoryArgs {
    /// Comic theme; empty or missing uses the default theme.
    #[arg(long)]
    theme: Option<String>,

    /// JSON run configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PanelArgs {
    /// Image prompt.
    #[arg(long)]
    prompt: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// JSON run configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// Inspect this font file instead of searching system fonts.
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Create(args) => cmd_create(args),
        Command::Story(args) => cmd_story(args),
        Command::Panel(args) => cmd_panel(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<comicraft::ComicConfig> {
    match path {
        Some(p) => Ok(comicraft::ComicConfig::from_path(p)?),
        None => Ok(comicraft::ComicConfig::default()),
    }
}

fn prompt_theme() -> anyhow::Result<String> {
    let mut stdout = std::io::stdout();
    write!(
        stdout,
        "Enter your comic theme (e.g., 'Robot detective in Paris'): "
    )?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read theme from stdin")?;
    Ok(line)
}

fn cmd_create(args: CreateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(out) = args.out {
        cfg.output_dir = out;
    }
    if let Some(font) = args.font {
        cfg.caption.font_path = Some(font);
    }
    if args.parallel {
        cfg.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }

    let raw_theme = match args.theme {
        Some(t) => t,
        None => prompt_theme()?,
    };
    let theme = comicraft::Theme::or_default(&raw_theme);

    let fonts = comicraft::FontLibrary::system();
    let pipeline = cfg.build(&fonts)?;
    let run = pipeline.run(&theme, &cfg.output_dir)?;

    let strip = std::fs::canonicalize(&run.strip_path)
        .with_context(|| format!("resolve strip path '{}'", run.strip_path.display()))?;
    println!("Comic created: file://{}", strip.display());
    println!("Individual panels:");
    for panel in &run.panels {
        let note = match &panel.origin {
            comicraft::PanelOrigin::Engine => String::new(),
            comicraft::PanelOrigin::Fallback { reason } => format!(" (placeholder: {reason})"),
        };
        println!(
            "  {}: {}{note}",
            panel.section.title(),
            panel.path.display()
        );
    }
    eprintln!("done in {:.2}s", run.elapsed.as_secs_f64());
    Ok(())
}

fn cmd_story(args: StoryArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let theme = comicraft::Theme::or_default(args.theme.as_deref().unwrap_or_default());
    let source = cfg.build_story_source()?;
    let story = source.generate_story(&theme)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&story).context("serialize story")?
    );
    Ok(())
}

fn cmd_panel(args: PanelArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let fonts = comicraft::FontLibrary::system();
    let source = cfg.build_image_source(&fonts)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let panel = source.generate_image(&args.prompt, &args.out)?;
    if let comicraft::PanelOrigin::Fallback { reason } = panel.origin() {
        eprintln!("engine failed, wrote placeholder: {reason}");
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_fonts(args: FontsArgs) -> anyhow::Result<()> {
    let fonts = comicraft::FontLibrary::system();
    eprintln!("caption font diagnostics:");
    eprintln!("  system_faces: {}", fonts.face_count());

    let font = match &args.font {
        Some(path) => Some(comicraft::CaptionFont::from_path(path)?),
        None => fonts.caption_font(),
    };
    match font {
        Some(font) => {
            let source = match &args.font {
                Some(path) => path.display().to_string(),
                None => "system".to_string(),
            };
            eprintln!("  font_source:  {source}");
            eprintln!("  family:       {}", font.family());
            eprintln!("  sha256:       {}", sha256_hex(font.bytes()));
        }
        None => eprintln!("  no caption font found; captions will be skipped"),
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
