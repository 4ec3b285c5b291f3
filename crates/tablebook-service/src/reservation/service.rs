//! Reservation capacity engine: create, update and delete with capacity
//! enforcement, plus read accessors.

use std::future::Future;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use tablebook_core::config::ReservationConfig;
use tablebook_core::error::ErrorKind;
use tablebook_core::traits::Clock;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_database::store::{ReservationStore, UserDirectory};
use tablebook_entity::reservation::{NewReservation, Reservation};

use super::error::ReservationError;
use super::ledger::{BucketOccupancy, CapacityLedger};
use super::validator::{ReservationRequest, ReservationValidator};

/// Orchestrates validation, occupancy checks and persistence.
///
/// Every write runs in a single store transaction: the bucket locks, the
/// occupancy read, the capacity decision and the write commit together,
/// so no bucket ever holds more seats than its area's ceiling.
/// Authorization is the caller's job (see [`super::ReservationAccess`]).
#[derive(Debug, Clone)]
pub struct ReservationService {
    /// Reservation persistence.
    store: Arc<dyn ReservationStore>,
    /// User lookup for new reservations.
    users: Arc<dyn UserDirectory>,
    /// Field and deadline rules.
    validator: ReservationValidator,
    /// Seat ceilings and occupancy.
    ledger: CapacityLedger,
    /// Source of "now".
    clock: Arc<dyn Clock>,
    /// Re-runs allowed after a transaction conflict.
    conflict_retries: u32,
}

impl ReservationService {
    /// Creates a new reservation service.
    pub fn new(
        store: Arc<dyn ReservationStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        config: &ReservationConfig,
    ) -> Self {
        Self {
            store,
            users,
            validator: ReservationValidator::new(config),
            ledger: CapacityLedger::new(config.capacity),
            clock,
            conflict_retries: config.conflict_retries,
        }
    }

    /// Creates a reservation for `user_id`.
    pub async fn create_reservation(
        &self,
        user_id: UserId,
        request: ReservationRequest,
    ) -> Result<Reservation, ReservationError> {
        let now = self.clock.now();
        let slot = self
            .validator
            .validate_new(&request, now)
            .inspect_err(|e| debug!(%user_id, error = %e, "Reservation request rejected"))?;

        let user = self
            .users
            .resolve_user(user_id)
            .await?
            .ok_or(ReservationError::UserNotFound(user_id))?;

        let new = slot.into_new(user.id);
        let created = self
            .with_conflict_retry("create", || self.try_create(&new))
            .await?;

        info!(
            reservation_id = %created.id,
            user_id = %created.user_id,
            area = %created.area,
            date = %created.reservation_date,
            time = %created.reservation_time,
            party_size = created.party_size,
            "Reservation created"
        );
        Ok(created)
    }

    /// Replaces date, time, party size and area of reservation `id`.
    ///
    /// Fails with [`ReservationError::LateChange`] once the existing
    /// reservation is within the advance-notice period, whatever the new
    /// values are. On any failure the stored reservation is unchanged.
    pub async fn update_reservation(
        &self,
        id: ReservationId,
        request: ReservationRequest,
    ) -> Result<Reservation, ReservationError> {
        let now = self.clock.now();
        let updated = self
            .with_conflict_retry("update", || self.try_update(id, &request, now))
            .await?;

        info!(
            reservation_id = %updated.id,
            area = %updated.area,
            date = %updated.reservation_date,
            time = %updated.reservation_time,
            party_size = updated.party_size,
            "Reservation updated"
        );
        Ok(updated)
    }

    /// Physically removes reservation `id` and returns what was removed.
    pub async fn delete_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Reservation, ReservationError> {
        let now = self.clock.now();
        let deleted = self
            .with_conflict_retry("delete", || self.try_delete(id, now))
            .await?;

        info!(
            reservation_id = %deleted.id,
            user_id = %deleted.user_id,
            "Reservation deleted"
        );
        Ok(deleted)
    }

    /// Gets a reservation by ID.
    pub async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, ReservationError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ReservationError::ReservationNotFound(id))
    }

    /// Lists every reservation, soonest first.
    pub async fn list_all(&self) -> Result<Vec<Reservation>, ReservationError> {
        Ok(self.store.find_all().await?)
    }

    /// Lists the reservations owned by `user_id`.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>, ReservationError> {
        Ok(self.store.find_by_user(user_id).await?)
    }

    /// Lists the reservations on `date`.
    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Reservation>, ReservationError> {
        Ok(self.store.find_by_date(date).await?)
    }

    /// Lists the reservations dated within `[start, end]`.
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, ReservationError> {
        Ok(self.store.find_between(start, end).await?)
    }

    /// Seats reserved and remaining per area on `date`.
    pub async fn availability(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<BucketOccupancy>, ReservationError> {
        Ok(self.ledger.occupancy(self.store.as_ref(), date).await?)
    }

    async fn try_create(&self, new: &NewReservation) -> Result<Reservation, ReservationError> {
        let bucket = new.bucket();
        let mut tx = self.store.begin().await?;
        tx.lock_buckets(&[bucket]).await?;

        let reserved = self.ledger.reserved_seats(tx.as_mut(), bucket).await?;
        self.ledger.ensure_fits(bucket, reserved, 0, new.party_size)?;

        // The owner was resolved before the transaction; a foreign-key miss
        // here means the account was removed since.
        let created = tx.insert(new).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                ReservationError::UserNotFound(new.user_id)
            } else {
                ReservationError::Store(e)
            }
        })?;
        tx.commit().await?;
        Ok(created)
    }

    async fn try_update(
        &self,
        id: ReservationId,
        request: &ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<Reservation, ReservationError> {
        let mut tx = self.store.begin().await?;
        let existing = tx
            .find_for_update(id)
            .await?
            .ok_or(ReservationError::ReservationNotFound(id))?;

        self.validator
            .validate_modification(&existing, now)
            .inspect_err(|e| debug!(reservation_id = %id, error = %e, "Update rejected"))?;
        let slot = self
            .validator
            .validate_new(request, now)
            .inspect_err(|e| debug!(reservation_id = %id, error = %e, "Update rejected"))?;

        let seats_moved = slot.date != existing.reservation_date
            || slot.area != existing.area
            || slot.party_size != existing.party_size;

        if seats_moved {
            let from = existing.bucket();
            let to = slot.bucket();
            tx.lock_buckets(&[from, to]).await?;

            let reserved = self.ledger.reserved_seats(tx.as_mut(), to).await?;
            // Only a reservation that stays in its bucket frees its own seats.
            let released = if from == to { existing.party_size } else { 0 };
            self.ledger
                .ensure_fits(to, reserved, released, slot.party_size)?;
        }

        let mut changed = existing;
        slot.apply_to(&mut changed);
        let updated = tx.update(&changed).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn try_delete(
        &self,
        id: ReservationId,
        now: NaiveDateTime,
    ) -> Result<Reservation, ReservationError> {
        let mut tx = self.store.begin().await?;
        let existing = tx
            .find_for_update(id)
            .await?
            .ok_or(ReservationError::ReservationNotFound(id))?;

        self.validator
            .validate_cancellation(&existing, now)
            .inspect_err(|e| debug!(reservation_id = %id, error = %e, "Cancellation rejected"))?;

        if !tx.delete(id).await? {
            return Err(ReservationError::ReservationNotFound(id));
        }
        tx.commit().await?;
        Ok(existing)
    }

    /// Runs `attempt` and re-runs it after a store transaction conflict,
    /// at most `conflict_retries` more times. Business-rule failures and
    /// other store errors are returned as they are.
    async fn with_conflict_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, ReservationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ReservationError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(ReservationError::Store(err))
                    if err.is_transaction_conflict() && retries < self.conflict_retries =>
                {
                    retries += 1;
                    warn!(operation, retry = retries, error = %err, "Transaction conflict, retrying");
                }
                result => return result,
            }
        }
    }
}
