//! Tablebook command-line entry point.
//!
//! Loads configuration, initialises logging and drives the reservation
//! engine in-process against PostgreSQL.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use tablebook_core::config::AppConfig;
use tablebook_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_path(), &cli.environment()) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(&config).await {
        report_failure(&e);
        output::print_error(&e.message);
        std::process::exit(1);
    }
}

/// Log a failed command. Rejected requests are expected and stay at debug.
fn report_failure(err: &AppError) {
    if err.kind.is_infrastructure() {
        tracing::error!(kind = %err.kind, "Command failed: {}", err.message);
    } else {
        tracing::debug!(kind = %err.kind, "Command rejected: {}", err.message);
    }
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
