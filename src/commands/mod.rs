//! CLI command definitions and dispatch.

pub mod availability;
pub mod migrate;
pub mod reservation;

use std::sync::Arc;

use chrono::NaiveTime;
use clap::{Parser, Subcommand};

use tablebook_core::config::AppConfig;
use tablebook_core::error::AppError;
use tablebook_database::DatabasePool;
use tablebook_database::repositories::UserRepository;
use tablebook_service::{ReservationAccess, ReservationError, ReservationService, SystemClock};

use crate::output::OutputFormat;

/// Tablebook: restaurant table reservations
#[derive(Debug, Parser)]
#[command(name = "tablebook", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file [default: $TABLEBOOK_CONFIG or config/default.toml]
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Configuration overlay to apply [default: $TABLEBOOK_ENV or development]
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Create, change, cancel and list reservations
    Reservation(reservation::ReservationArgs),
    /// Show free seats per area for a date
    Availability(availability::AvailabilityArgs),
}

impl Cli {
    /// Configuration file path from the flag, then `TABLEBOOK_CONFIG`.
    pub fn config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var("TABLEBOOK_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string())
    }

    /// Environment overlay name from the flag, then `TABLEBOOK_ENV`.
    pub fn environment(&self) -> String {
        self.env
            .clone()
            .or_else(|| std::env::var("TABLEBOOK_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Reservation(args) => reservation::execute(args, config, self.format).await,
            Commands::Availability(args) => availability::execute(args, config, self.format).await,
        }
    }
}

/// The engine and its collaborators wired against PostgreSQL.
pub struct Engine {
    /// Database pool, closed when the command finishes.
    pub db: DatabasePool,
    /// Reservation engine.
    pub service: ReservationService,
    /// Capability checks.
    pub access: ReservationAccess,
    /// User lookups.
    pub users: UserRepository,
}

impl Engine {
    /// Connect to the database and build the engine.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        let store = Arc::new(db.reservation_store());
        let users = db.user_repository();

        let service = ReservationService::new(
            store.clone(),
            Arc::new(users.clone()),
            Arc::new(SystemClock),
            &config.reservation,
        );
        let access = ReservationAccess::new(store);

        Ok(Self {
            db,
            service,
            access,
            users,
        })
    }
}

/// Convert an engine failure into a CLI error, keeping the user-facing
/// sentence for business-rule outcomes.
pub fn engine_error(err: ReservationError) -> AppError {
    if err.is_business_rule() {
        AppError::new(err.kind(), format!("{} ({err})", err.user_message()))
    } else {
        err.into()
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{value}', expected HH:MM"))
}
