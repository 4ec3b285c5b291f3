//! Seat availability report.

use chrono::NaiveDate;
use clap::Args;

use tablebook_core::config::AppConfig;
use tablebook_core::error::AppError;

use crate::output::{self, OccupancyRow, OutputFormat};

/// Arguments for the availability command
#[derive(Debug, Args)]
pub struct AvailabilityArgs {
    /// Date to report on (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: NaiveDate,
}

/// Print reserved and remaining seats per area
pub async fn execute(
    args: &AvailabilityArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::Engine::connect(config).await?;

    let report = engine
        .service
        .availability(args.date)
        .await
        .map_err(super::engine_error)?;
    let rows: Vec<OccupancyRow> = report.iter().map(OccupancyRow::from).collect();
    output::print_list(&rows, format);

    engine.db.close().await;
    Ok(())
}
