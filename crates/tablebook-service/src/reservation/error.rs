//! Typed outcome of every reservation engine operation.
//!
//! Business-rule failures are expected results of normal operation and are
//! returned as distinct variants so callers must handle each one. Store
//! failures are wrapped in [`ReservationError::Store`] and are the only
//! variant that may be retried.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use tablebook_core::error::{AppError, ErrorKind};
use tablebook_core::types::{ReservationId, UserId};
use tablebook_entity::reservation::Area;

/// Error type for reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The requested date and time is not strictly after now.
    #[error("Reservation date {date} {time} is not in the future")]
    InvalidDate {
        /// Requested date.
        date: NaiveDate,
        /// Requested time.
        time: NaiveTime,
    },

    /// The requested time falls outside every service window.
    #[error("Reservation time {time} is outside the service hours")]
    InvalidTime {
        /// Requested time.
        time: NaiveTime,
    },

    /// Party size outside the configured bounds.
    #[error("Party size {party_size} is outside the allowed range {min}-{max}")]
    InvalidPartySize {
        /// Requested party size.
        party_size: i32,
        /// Smallest accepted party.
        min: u32,
        /// Largest accepted party.
        max: u32,
    },

    /// The area name does not match any known area.
    #[error("Unknown area: {name}")]
    UnknownArea {
        /// The name as supplied.
        name: String,
    },

    /// The owning user does not exist.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The reservation does not exist.
    #[error("Reservation {0} not found")]
    ReservationNotFound(ReservationId),

    /// The party does not fit into the area on that date.
    #[error("Area {area} is fully booked on {date} (capacity {capacity})")]
    CapacityExceeded {
        /// Target area.
        area: Area,
        /// Target date.
        date: NaiveDate,
        /// The area's seat ceiling.
        capacity: u32,
    },

    /// The reservation is too close to modify.
    #[error("Reservation can no longer be changed; the deadline was {deadline}")]
    LateChange {
        /// Last moment at which a change was accepted.
        deadline: NaiveDateTime,
    },

    /// The reservation is too close to cancel.
    #[error("Reservation can no longer be cancelled; the deadline was {deadline}")]
    LateCancellation {
        /// Last moment at which a cancellation was accepted.
        deadline: NaiveDateTime,
    },

    /// The caller may not act on the target.
    #[error("Not allowed to access {target}")]
    Forbidden {
        /// What the caller tried to reach, e.g. `reservation 7`.
        target: String,
    },

    /// Infrastructure failure in the store or the user directory.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl ReservationError {
    /// The application-wide error category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDate { .. }
            | Self::InvalidTime { .. }
            | Self::InvalidPartySize { .. }
            | Self::UnknownArea { .. } => ErrorKind::Validation,
            Self::UserNotFound(_) | Self::ReservationNotFound(_) => ErrorKind::NotFound,
            Self::CapacityExceeded { .. } | Self::LateChange { .. } | Self::LateCancellation { .. } => {
                ErrorKind::Conflict
            }
            Self::Forbidden { .. } => ErrorKind::Authorization,
            Self::Store(err) => err.kind,
        }
    }

    /// Whether this is an expected business outcome rather than an
    /// infrastructure failure.
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, Self::Store(_))
    }

    /// A sentence the end user can act on.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDate { .. } => "Please choose a date and time in the future.".to_string(),
            Self::InvalidTime { .. } => {
                "Please choose a time during lunch or dinner service.".to_string()
            }
            Self::InvalidPartySize { min, max, .. } => {
                format!("Reservations are for {min} to {max} people.")
            }
            Self::UnknownArea { .. } => "Please choose the indoor or outdoor area.".to_string(),
            Self::UserNotFound(_) => "Your account could not be found.".to_string(),
            Self::ReservationNotFound(_) => "This reservation does not exist.".to_string(),
            Self::CapacityExceeded { area, date, .. } => format!(
                "The {} area is full on {date}. Please choose another date or area.",
                area.as_str().to_lowercase()
            ),
            Self::LateChange { deadline } => format!(
                "Changes must be made in advance; this reservation could be changed until {}.",
                deadline.format("%Y-%m-%d %H:%M")
            ),
            Self::LateCancellation { deadline } => format!(
                "Cancellations must be made in advance; this reservation could be cancelled until {}.",
                deadline.format("%Y-%m-%d %H:%M")
            ),
            Self::Forbidden { .. } => "You may only manage your own reservations.".to_string(),
            Self::Store(_) => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Store(inner) => inner,
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}
