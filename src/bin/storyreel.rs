use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a manifest and print a one-line summary.
    Validate(SourceArgs),
    /// Print the normalized schedule as JSON.
    Plan(SourceArgs),
    /// Ready every scene's media from disk and report failures.
    Preload(PreloadArgs),
    /// Play the timeline headlessly in real time.
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Base location for relative media paths. Defaults to the manifest's directory.
    #[arg(long)]
    base: Option<String>,
}

#[derive(Args, Debug)]
struct PreloadArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Maximum concurrent loads.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Extra attempts per asset after the first failure.
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, default_value_t = 8000)]
    timeout_ms: u64,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Player options JSON file.
    #[arg(long)]
    opts: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Preload(args) => cmd_preload(args).await,
        Command::Play(args) => cmd_play(args).await,
    }
}

fn load_schedule(args: &SourceArgs) -> anyhow::Result<storyreel::Schedule> {
    let manifest = storyreel::Manifest::from_path(&args.in_path)?;
    let base = match &args.base {
        Some(b) => b.clone(),
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_string_lossy()
            .into_owned(),
    };
    let schedule = manifest
        .normalize(&base)
        .with_context(|| format!("normalize manifest '{}'", args.in_path.display()))?;
    Ok(schedule)
}

fn cmd_validate(args: SourceArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args)?;
    let theme = match schedule.theme {
        storyreel::Theme::Light => "light",
        storyreel::Theme::Dark => "dark",
    };
    let events: usize = schedule.scenes.iter().map(|s| s.event_count()).sum();
    println!(
        "ok: {} scenes, {} events, {:.2}s, theme {theme}",
        schedule.len(),
        events,
        schedule.total_duration
    );
    Ok(())
}

fn cmd_plan(args: SourceArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args)?;
    let json = serde_json::to_string_pretty(&schedule).context("serialize schedule")?;
    println!("{json}");
    Ok(())
}

async fn cmd_preload(args: PreloadArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args.source)?;
    let opts = storyreel::PreloadOpts {
        concurrency: args.concurrency,
        retry_count: args.retries,
        timeout_ms: args.timeout_ms,
        ..storyreel::PreloadOpts::default()
    };
    let loader = Arc::new(storyreel::FsAssetLoader::new("."));
    let cancel = CancellationToken::new();

    let report = storyreel::preload_all(loader, schedule.media_urls(), opts, &cancel, |ev| {
        if let storyreel::PreloadEvent::Settled(task) = ev {
            match &task.outcome {
                Ok(()) => println!("ready  {}", task.url),
                Err(e) => println!("failed {} ({} attempts): {e}", task.url, task.attempts_used),
            }
        }
    })
    .await;

    println!(
        "preloaded {} assets: {} ready, {} failed",
        report.tasks.len(),
        report.ready_count(),
        report.failed_count()
    );
    Ok(())
}

async fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args.source)?;
    let opts = match &args.opts {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read player options '{}'", path.display()))?;
            storyreel::PlayerOpts::from_json_str(&s)?
        }
        None => storyreel::PlayerOpts::default(),
    };

    let loader = Arc::new(storyreel::FsAssetLoader::new("."));
    let mut player =
        storyreel::Player::new(schedule, loader, storyreel::MemorySurface::new(), opts);
    let summary = player.run(&CancellationToken::new()).await?;

    let last = summary
        .active_index
        .map(|i| i.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!(
        "finished on scene {last}: {} events fired in {:.2}s",
        summary.fired_events, summary.elapsed
    );
    Ok(())
}
