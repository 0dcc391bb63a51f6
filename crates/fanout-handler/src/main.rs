//! Fanout - event-triggered file router
//!
//! Reads one storage event, downloads the object it names and copies it to
//! every destination whose output rule matches.

use anyhow::Context;
use clap::Parser;
use fanout_core::config::LoggingConfig;
use fanout_core::FanoutConfig;
use fanout_handler::handle_request;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fanout")]
#[command(version = fanout_core::VERSION)]
#[command(about = "Route storage events to output storage providers", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to the function secrets directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the event from a file instead of stdin
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FANOUT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (pretty, json)
    #[arg(long, env = "FANOUT_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level,
        format: cli.log_format,
    };
    init_logging(&logging);

    let config_path = cli.config.unwrap_or_else(FanoutConfig::locate);
    debug!("Using configuration {:?}", config_path);

    let payload = match &cli.event {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Cannot read event file {:?}", path))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Cannot read event from stdin")?;
            buf
        }
    };

    let output = handle_request(&payload, &config_path).await;
    print!("{}", output);

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
