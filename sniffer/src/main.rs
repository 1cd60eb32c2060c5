mod output;
mod render;

use crate::output::{OutputMode, consume};
use clap::Parser;
use sniffer_core::Pipeline;
use sniffer_core::conf::{ConfigOverrides, load_config};
use sniffer_core::logging::init_logging;
use sniffer_core::shutdown::shutdown_listener;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "http-sniffer",
    version,
    about = "HTTP-SNIFFER monitors access logs",
    long_about = "HTTP-SNIFFER follows an access log, summarises traffic per interval \
                  and alerts when the smoothed request count crosses a threshold"
)]
struct Cli {
    /// Path to the access log file
    #[arg(short = 'f', long)]
    log_file: Option<PathBuf>,

    /// How often window stats are captured, in seconds
    #[arg(short = 's', long)]
    stats_interval: Option<u64>,

    /// How often the request threshold is checked, in minutes
    #[arg(short = 'm', long)]
    monitor_interval: Option<u64>,

    /// Smoothed request count above which an alert is raised
    #[arg(short = 't', long)]
    monitor_threshold: Option<f64>,

    /// Optional TOML config file; flags given here override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write logs to a daily rolling file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputMode::Console)]
    output: OutputMode,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            log_file: self.log_file.clone(),
            stats_interval_secs: self.stats_interval,
            monitor_interval_mins: self.monitor_interval,
            alert_threshold: self.monitor_threshold,
            log_dir: self.log_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.overrides())?;

    let _log_guard = init_logging(&config.logging);
    let shutdown = shutdown_listener()?;

    let pipeline = match Pipeline::start(&config, shutdown.clone()).await {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!(%err, "could not start monitoring");
            return Err(err.into());
        }
    };

    let result = consume(pipeline, cli.output, shutdown).await;
    if let Err(err) = &result {
        error!(%err, "monitoring stopped with an error");
    }

    info!("http-sniffer shutting down");
    result
}
