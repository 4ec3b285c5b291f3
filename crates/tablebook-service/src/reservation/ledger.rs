//! Aggregate seat occupancy per (area, date) bucket.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tablebook_core::config::AreaCapacityConfig;
use tablebook_core::result::AppResult;
use tablebook_database::store::{ReservationStore, ReservationTx};
use tablebook_entity::reservation::{Area, Bucket};

use super::error::ReservationError;

/// Occupancy snapshot of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketOccupancy {
    /// Seating area.
    pub area: Area,
    /// Calendar date.
    pub date: NaiveDate,
    /// Seat ceiling of the area.
    pub capacity: u32,
    /// Seats held by committed reservations.
    pub reserved: i64,
    /// Seats still free; never negative.
    pub remaining: i64,
}

/// Computes occupancy from the store and decides whether a party fits.
///
/// Holds no counters of its own. Occupancy is always derived from the
/// store so every node sees the same numbers.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    capacity: AreaCapacityConfig,
}

impl CapacityLedger {
    /// Creates a ledger with the given seat ceilings.
    pub fn new(capacity: AreaCapacityConfig) -> Self {
        Self { capacity }
    }

    /// Seat ceiling of `area`.
    pub fn capacity(&self, area: Area) -> u32 {
        area.capacity(&self.capacity)
    }

    /// Seats reserved in `bucket`, as seen by the open transaction.
    pub async fn reserved_seats(
        &self,
        tx: &mut dyn ReservationTx,
        bucket: Bucket,
    ) -> AppResult<i64> {
        tx.reserved_seats_between(bucket.area, bucket.date, bucket.date)
            .await
    }

    /// Checks that `party_size` more seats fit into `bucket`.
    ///
    /// `released` is the contribution of the reservation being modified
    /// when it already sits in `bucket`, zero otherwise.
    pub fn ensure_fits(
        &self,
        bucket: Bucket,
        reserved: i64,
        released: i32,
        party_size: i32,
    ) -> Result<(), ReservationError> {
        let capacity = self.capacity(bucket.area);
        let total = reserved - i64::from(released) + i64::from(party_size);

        if total > i64::from(capacity) {
            debug!(
                %bucket,
                reserved,
                released,
                party_size,
                capacity,
                "Party does not fit into bucket"
            );
            return Err(ReservationError::CapacityExceeded {
                area: bucket.area,
                date: bucket.date,
                capacity,
            });
        }
        Ok(())
    }

    /// Occupancy of every area on `date`.
    pub async fn occupancy(
        &self,
        store: &dyn ReservationStore,
        date: NaiveDate,
    ) -> AppResult<Vec<BucketOccupancy>> {
        let mut report = Vec::with_capacity(Area::ALL.len());
        for area in Area::ALL {
            let capacity = self.capacity(area);
            let reserved = store.reserved_seats_between(area, date, date).await?;
            report.push(BucketOccupancy {
                area,
                date,
                capacity,
                reserved,
                remaining: (i64::from(capacity) - reserved).max(0),
            });
        }
        Ok(report)
    }
}
