//! Business-rule validation for reservation requests.
//!
//! Pure checks with no side effects. Every check takes `now` explicitly so
//! callers read the clock exactly once per operation.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use tablebook_core::config::{PartySizeConfig, ReservationConfig, ServiceWindowConfig};
use tablebook_core::types::UserId;
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};

use super::error::ReservationError;

/// Proposed reservation values as received from a caller.
///
/// The area is kept as the caller's raw string so an unknown name is
/// reported as [`ReservationError::UnknownArea`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Requested date.
    pub date: NaiveDate,
    /// Requested arrival time.
    pub time: NaiveTime,
    /// Number of guests.
    pub party_size: i32,
    /// Requested area name, e.g. `"indoor"`.
    pub area: String,
}

impl ReservationRequest {
    /// Creates a request.
    pub fn new(date: NaiveDate, time: NaiveTime, party_size: i32, area: impl Into<String>) -> Self {
        Self {
            date,
            time,
            party_size,
            area: area.into(),
        }
    }
}

/// A request that passed every field-level rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSlot {
    /// Reservation date.
    pub date: NaiveDate,
    /// Arrival time truncated to the minute.
    pub time: NaiveTime,
    /// Number of guests.
    pub party_size: i32,
    /// Resolved area.
    pub area: Area,
}

impl ValidatedSlot {
    /// The bucket this slot would occupy.
    pub fn bucket(&self) -> Bucket {
        Bucket::new(self.area, self.date)
    }

    /// Insert payload for a reservation owned by `user_id`.
    pub fn into_new(self, user_id: UserId) -> NewReservation {
        NewReservation {
            reservation_date: self.date,
            reservation_time: self.time,
            party_size: self.party_size,
            area: self.area,
            user_id,
        }
    }

    /// Copy the slot onto an existing reservation.
    pub fn apply_to(&self, reservation: &mut Reservation) {
        reservation.reservation_date = self.date;
        reservation.reservation_time = self.time;
        reservation.party_size = self.party_size;
        reservation.area = self.area;
    }
}

/// Validates reservation requests against the configured business rules.
#[derive(Debug, Clone)]
pub struct ReservationValidator {
    /// Windows in which a reservation may start.
    service_windows: Vec<ServiceWindowConfig>,
    /// Accepted party sizes.
    party_size: PartySizeConfig,
    /// Minimum notice for changes and cancellations.
    advance_notice: Duration,
}

impl ReservationValidator {
    /// Creates a validator from reservation configuration.
    pub fn new(config: &ReservationConfig) -> Self {
        Self {
            service_windows: config.service_windows.clone(),
            party_size: config.party_size,
            advance_notice: Duration::hours(i64::from(config.advance_notice_hours)),
        }
    }

    /// Validates the fields of a new or modified reservation.
    ///
    /// Checks run in a fixed order and the first violation wins: date in
    /// the future, time inside a service window, party size, area.
    pub fn validate_new(
        &self,
        request: &ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<ValidatedSlot, ReservationError> {
        let time = truncate_to_minute(request.time);

        if request.date.and_time(time) <= now {
            return Err(ReservationError::InvalidDate {
                date: request.date,
                time,
            });
        }

        if !self.service_windows.iter().any(|w| w.contains(time)) {
            return Err(ReservationError::InvalidTime { time });
        }

        let size = i64::from(request.party_size);
        if size < i64::from(self.party_size.min) || size > i64::from(self.party_size.max) {
            return Err(ReservationError::InvalidPartySize {
                party_size: request.party_size,
                min: self.party_size.min,
                max: self.party_size.max,
            });
        }

        let area = request
            .area
            .parse::<Area>()
            .map_err(|_| ReservationError::UnknownArea {
                name: request.area.clone(),
            })?;

        Ok(ValidatedSlot {
            date: request.date,
            time,
            party_size: request.party_size,
            area,
        })
    }

    /// Rejects a change to `existing` once its advance-notice deadline has
    /// passed. Exactly at the deadline the change is still accepted.
    pub fn validate_modification(
        &self,
        existing: &Reservation,
        now: NaiveDateTime,
    ) -> Result<(), ReservationError> {
        let deadline = existing.change_deadline(self.advance_notice);
        if now > deadline {
            return Err(ReservationError::LateChange { deadline });
        }
        Ok(())
    }

    /// Same deadline as [`Self::validate_modification`], reported as a
    /// late cancellation.
    pub fn validate_cancellation(
        &self,
        existing: &Reservation,
        now: NaiveDateTime,
    ) -> Result<(), ReservationError> {
        self.validate_modification(existing, now)
            .map_err(|_| ReservationError::LateCancellation {
                deadline: existing.change_deadline(self.advance_notice),
            })
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
