//! Subgrab - Subtitle Fetcher for Local Videos
//!
//! Entry point: scans a directory (the current one by default) and downloads
//! a subtitle for every video that does not have one yet.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};

use subgrab::cli::{Args, Commands};
use subgrab::config::Config;
use subgrab::hash::compute_hash;
use subgrab::orchestrator::SubtitleOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Flushes the file appender on drop
    let _log_guard = setup_logging(args.verbose)?;

    match args.command {
        Some(Commands::Hash { input }) => {
            let hash = compute_hash(&input).await?;
            println!("{}  {}", hash, input.display());
        }
        Some(Commands::InitConfig { output }) => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        None => {
            let config = Config::discover(args.config.as_deref())?;
            let orchestrator = SubtitleOrchestrator::from_config(&config)?;
            info!(
                "Fetching subtitles for {} into {}",
                args.directory.display(),
                orchestrator.output_dir().display()
            );
            orchestrator.run(&args.directory).await?;
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".subgrab").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "subgrab.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subgrab.log").display());

    Ok(guard)
}
