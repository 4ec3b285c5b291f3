//! Reservation entity model.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tablebook_core::types::{ReservationId, UserId};

use super::area::Area;

/// A committed table reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// Store-assigned identifier.
    pub id: ReservationId,
    /// Calendar date of the booking.
    pub reservation_date: NaiveDate,
    /// Arrival time, minute precision.
    pub reservation_time: NaiveTime,
    /// Number of guests.
    #[sqlx(rename = "number_of_people")]
    pub party_size: i32,
    /// Seating area.
    pub area: Area,
    /// Owning user.
    pub user_id: UserId,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Scheduled date and time of the booking.
    pub fn date_time(&self) -> NaiveDateTime {
        self.reservation_date.and_time(self.reservation_time)
    }

    /// The (area, date) pair this reservation occupies.
    pub fn bucket(&self) -> Bucket {
        Bucket::new(self.area, self.reservation_date)
    }

    /// Last moment at which the reservation may still be changed or
    /// cancelled, given the required notice.
    pub fn change_deadline(&self, notice: Duration) -> NaiveDateTime {
        self.date_time() - notice
    }
}

/// Data required to insert a new reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Calendar date of the booking.
    pub reservation_date: NaiveDate,
    /// Arrival time, minute precision.
    pub reservation_time: NaiveTime,
    /// Number of guests.
    pub party_size: i32,
    /// Seating area.
    pub area: Area,
    /// Owning user.
    pub user_id: UserId,
}

impl NewReservation {
    /// The (area, date) pair the new reservation will occupy.
    pub fn bucket(&self) -> Bucket {
        Bucket::new(self.area, self.reservation_date)
    }
}

/// An (area, date) pair against which aggregate occupancy is tracked.
///
/// Ordered by area, then date. Callers that lock several buckets sort them
/// first so every transaction acquires locks in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bucket {
    /// Seating area.
    pub area: Area,
    /// Calendar date.
    pub date: NaiveDate,
}

impl Bucket {
    /// Creates a bucket.
    pub fn new(area: Area, date: NaiveDate) -> Self {
        Self { area, date }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.area, self.date)
    }
}
