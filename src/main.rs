mod config;
mod error;
mod monitor;
mod thingspeak;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;
use std::process;
use tokio::signal;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::monitor::Monitor;

/// Periodically read an Omron environment sensor and upload the readings to ThingSpeak.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Run a single cycle immediately and exit.
    #[arg(long)]
    once: bool,
    /// Optional directory for daily rotated log files, in addition to the console.
    #[arg(short, long)]
    log_dir: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn setup_logging(log_dir: Option<&PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Option<WorkerGuard> {
    let console_layer = tracing_subscriber::fmt::layer().with_target(false);

    let (file_layer, guard) = if let Some(dir) = log_dir {
        let appender = tracing_appender::rolling::daily(dir, "omron-env.log");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // INFO by default, DEBUG with -v; RUST_LOG wins when set
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        info!("Logging to directory: {:?}", dir);
    }

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_dir.as_ref(), &cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Application failed: {:?}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    if cli.once {
        monitor::run_once(&config).await.context("Single cycle failed")?;
        return Ok(());
    }

    tokio::select! {
        _ = Monitor::new(cli.config, config).run() => {}
        res = signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            info!("Monitoring stopped by user.");
        }
    }
    Ok(())
}
