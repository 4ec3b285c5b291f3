//! Classification of sqlx errors into [`AppError`] kinds.

use tablebook_core::error::{AppError, ErrorKind};

/// PostgreSQL SQLSTATE codes the store reacts to.
pub mod sqlstate {
    /// `serialization_failure`
    pub const SERIALIZATION_FAILURE: &str = "40001";
    /// `deadlock_detected`
    pub const DEADLOCK_DETECTED: &str = "40P01";
    /// `foreign_key_violation`
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    /// `check_violation`
    pub const CHECK_VIOLATION: &str = "23514";
}

/// Map a sqlx error into an [`AppError`], keeping `context` as the message
/// prefix.
///
/// Serialization failures and deadlocks become
/// [`ErrorKind::TransactionConflict`] so the engine can re-run the
/// transaction. Lock timeouts (`55P03`) and cancelled statements (`57014`)
/// stay generic database errors.
pub fn map_sqlx(context: &str, err: sqlx::Error) -> AppError {
    let code = match &err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    };

    let kind = match code.as_deref() {
        Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
            ErrorKind::TransactionConflict
        }
        Some(sqlstate::FOREIGN_KEY_VIOLATION) => ErrorKind::NotFound,
        Some(sqlstate::CHECK_VIOLATION) => ErrorKind::Validation,
        _ => ErrorKind::Database,
    };

    AppError::with_source(kind, format!("{context}: {err}"), err)
}
