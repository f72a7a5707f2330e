//! creator-stats: clean, join and aggregate creator and video tables, then
//! export the results as date-partitioned Parquet.
//!
//! Runs once by default. With `--every <secs>` it keeps running on a fixed
//! cadence; each tick retries a failed run up to `--retries` times.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use creatorstats::config::PipelineConfig;
use creatorstats::error::Result;
use creatorstats::run::run_pipeline;
use creatorstats::stats::PipelineSummary;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(about = "Creator and video statistics pipeline")]
struct Args {
    /// Raw creators CSV. Overrides the config file and environment.
    #[arg(long)]
    creators: Option<PathBuf>,

    /// Raw videos CSV. Overrides the config file and environment.
    #[arg(long)]
    videos: Option<PathBuf>,

    /// Output root; datasets are written below it.
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON config file. Without it, defaults plus CREATOR_STATS_* variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run every N seconds instead of once.
    #[arg(long)]
    every: Option<u64>,

    /// Extra attempts after a failed run.
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// Seconds to wait between attempts.
    #[arg(long, default_value_t = 300)]
    retry_delay: u64,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::from_env()?,
    };
    if let Some(p) = &args.creators {
        config.creators_path = p.clone();
    }
    if let Some(p) = &args.videos {
        config.videos_path = p.clone();
    }
    if let Some(p) = &args.output {
        config.output_dir = p.clone();
    }
    config.validate()?;
    Ok(config)
}

/// One scheduled run: the first attempt plus up to `retries` more.
fn run_with_retries(config: &PipelineConfig, retries: u32, delay: Duration) -> Result<PipelineSummary> {
    let mut attempt = 0;
    loop {
        let start = Instant::now();
        match run_pipeline(config) {
            Ok(summary) => {
                info!(
                    attempt,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "run complete"
                );
                return Ok(summary);
            }
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!(error = %e, attempt, "run failed, retrying in {}s", delay.as_secs());
                thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!("Creators: {}", config.creators_path.display());
    info!("Videos:   {}", config.videos_path.display());
    info!("Output:   {}", config.output_dir.display());

    let delay = Duration::from_secs(args.retry_delay);
    match args.every {
        None => match run_with_retries(&config, args.retries, delay) {
            Ok(summary) => {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!(error = %e, "could not render summary"),
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "run failed");
                ExitCode::FAILURE
            }
        },
        Some(secs) => {
            let period = Duration::from_secs(secs.max(1));
            loop {
                let tick = Instant::now();
                if let Err(e) = run_with_retries(&config, args.retries, delay) {
                    error!(error = %e, "run failed; waiting for next tick");
                }
                if let Some(rest) = period.checked_sub(tick.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }
    }
}
