#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::config::{AppConfig, CliArgs};
use cli::stdin::StdinTriggerSource;
use tickpair::{FileLog, Pipeline};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        fast_period_ms = config.pipeline.fast_period.as_millis() as u64,
        slow_period_ms = config.pipeline.slow_period.as_millis() as u64,
        log_path = %config.log_path.display(),
        "starting capture pipeline (press 'c' to capture, 'g' to look up)"
    );

    let log = FileLog::create(&config.log_path)?;
    let source = StdinTriggerSource::new();
    let mut pipeline = Pipeline::spawn(config.pipeline, source, log);

    let print_events = async {
        while let Some(event) = pipeline.next_event().await {
            println!("{event}");
        }
    };

    tokio::select! {
        () = print_events => {
            tracing::info!("output stream ended");
        }
        result = signal::ctrl_c() => {
            result?;
            tracing::info!("received Ctrl+C, shutting down");
        }
    }

    pipeline.shutdown().await;
    tracing::info!("pipeline shut down successfully");
    Ok(())
}
