//! Database migration runner.

use sqlx::PgPool;
use tracing::{info, warn};

use tablebook_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Drop every Tablebook table and type, then re-run all migrations.
pub async fn reset_database(pool: &PgPool) -> Result<(), AppError> {
    warn!("Dropping all Tablebook tables");

    for statement in [
        "DROP TABLE IF EXISTS table_reservations",
        "DROP TABLE IF EXISTS users",
        "DROP TABLE IF EXISTS _sqlx_migrations",
        "DROP TYPE IF EXISTS reservation_area",
        "DROP TYPE IF EXISTS user_role",
    ] {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to reset database: {e}"),
                e,
            )
        })?;
    }

    run_migrations(pool).await
}
