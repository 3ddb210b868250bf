//! VisuLearn CLI - generate illustrated, narrated learning material.
//!
//! This CLI provides a `visulearn` command that plans a story, comic or photo
//! explanation with Gemini, then illustrates and narrates it unit by unit.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use visulearn_models::ProviderMode;

use commands::{comic, snap, story};

/// VisuLearn - illustrated, narrated lessons for children
#[derive(Parser, Debug)]
#[command(
    name = "visulearn",
    author,
    version,
    about = "VisuLearn - illustrated, narrated lessons for children",
    long_about = "VisuLearn plans a story, comic or photo explanation with a content model, then generates \
                  an image and narration for every part of it.\nRate limited calls are retried with \
                  exponential backoff; parts that still fail are reported and skipped."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (defaults to ./visulearn.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Providers to use: live (Gemini + ElevenLabs) or mock (offline, canned content)
    #[arg(long, default_value = "live", global = true)]
    provider: ProviderMode,

    /// Directory for result.json and generated assets
    #[arg(short, long, default_value = "visulearn-output", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a narrated, illustrated story
    ///
    /// Plans duration x 4 segments, then draws and narrates each one.
    Story(story::StoryArgs),

    /// Generate a comic
    ///
    /// Plans exactly the requested number of panels and draws each one.
    Comic(comic::ComicArgs),

    /// Explain a concept visible in a photo
    ///
    /// Finds one concept in the photo, annotates the photo and narrates the
    /// explanation.
    Snap(snap::SnapArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let context = commands::RunContext::load(args.config.as_deref(), args.provider, args.output)?;

    match args.command {
        Command::Story(story_args) => story::execute(story_args, &context).await,
        Command::Comic(comic_args) => comic::execute(comic_args, &context).await,
        Command::Snap(snap_args) => snap::execute(snap_args, &context).await,
    }
}
