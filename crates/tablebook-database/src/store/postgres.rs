//! PostgreSQL reservation store.
//!
//! Writers serialize per bucket on a transaction-scoped advisory lock
//! (`pg_advisory_xact_lock`) keyed by area and date, and lock the target
//! row with `SELECT ... FOR UPDATE` on update and delete. Occupancy read
//! after the bucket lock is therefore stable until commit.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use tablebook_core::error::AppError;
use tablebook_core::result::AppResult;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};
use tablebook_entity::user::User;

use super::{ReservationStore, ReservationTx, UserDirectory, lock_order};
use crate::error::map_sqlx;
use crate::repositories::reservation as queries;
use crate::repositories::{ReservationRepository, UserRepository};

/// Reservation store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgReservationStore {
    repo: ReservationRepository,
    /// Upper bound on any single lock wait inside a transaction.
    lock_timeout_ms: u64,
}

impl PgReservationStore {
    /// Create a store over `pool`.
    pub fn new(pool: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            repo: ReservationRepository::new(pool),
            lock_timeout_ms,
        }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn begin(&self) -> AppResult<Box<dyn ReservationTx>> {
        let mut tx = self
            .repo
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx("Failed to begin transaction", e))?;

        if self.lock_timeout_ms > 0 {
            queries::set_lock_timeout(&mut *tx, self.lock_timeout_ms).await?;
        }

        Ok(Box::new(PgReservationTx { tx }))
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        self.repo.find_by_id(id).await
    }

    async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        self.repo.find_all().await
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        self.repo.find_by_user(user_id).await
    }

    async fn find_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Reservation>> {
        self.repo.find_between(start, end).await
    }

    async fn reserved_seats_between(
        &self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        self.repo.reserved_seats_between(area, start, end).await
    }

    async fn exists_for_user(&self, id: ReservationId, user_id: UserId) -> AppResult<bool> {
        self.repo.exists_for_user(id, user_id).await
    }
}

/// Open PostgreSQL transaction. Rolled back by sqlx when dropped uncommitted.
struct PgReservationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReservationTx for PgReservationTx {
    async fn lock_buckets(&mut self, buckets: &[Bucket]) -> AppResult<()> {
        for bucket in lock_order(buckets) {
            debug!(%bucket, "Locking reservation bucket");
            queries::lock_bucket(&mut *self.tx, bucket).await?;
        }
        Ok(())
    }

    async fn find_for_update(&mut self, id: ReservationId) -> AppResult<Option<Reservation>> {
        queries::find_by_id_for_update(&mut *self.tx, id).await
    }

    async fn reserved_seats_between(
        &mut self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        queries::reserved_seats_between(&mut *self.tx, area, start, end).await
    }

    async fn insert(&mut self, new: &NewReservation) -> AppResult<Reservation> {
        queries::insert(&mut *self.tx, new).await
    }

    async fn update(&mut self, reservation: &Reservation) -> AppResult<Reservation> {
        queries::update(&mut *self.tx, reservation)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", reservation.id)))
    }

    async fn delete(&mut self, id: ReservationId) -> AppResult<bool> {
        queries::delete(&mut *self.tx, id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit transaction", e))
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.find_by_id(id).await
    }
}
