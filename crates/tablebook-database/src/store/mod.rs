//! Reservation store abstraction.
//!
//! The engine talks to persistence only through [`ReservationStore`] and
//! the unit of work it hands out, [`ReservationTx`]. Two implementations
//! are provided:
//! - PostgreSQL (per-bucket advisory locks inside a transaction)
//! - In-memory (a store-wide `tokio::sync::Mutex`, single node only)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use tablebook_core::result::AppResult;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};
use tablebook_entity::user::User;

pub use memory::{MemoryReservationStore, MemoryUserDirectory};
pub use postgres::PgReservationStore;

/// Durable record of reservations.
///
/// Reads may run outside a transaction. Every write goes through
/// [`ReservationStore::begin`] so that the occupancy read, the capacity
/// decision, and the write commit together.
#[async_trait]
pub trait ReservationStore: Send + Sync + std::fmt::Debug {
    /// Open a unit of work.
    async fn begin(&self) -> AppResult<Box<dyn ReservationTx>>;

    /// Find a reservation by id.
    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// Every reservation, soonest first.
    async fn find_all(&self) -> AppResult<Vec<Reservation>>;

    /// Reservations owned by `user_id`, soonest first.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;

    /// Reservations with a date in `[start, end]`, soonest first.
    async fn find_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Reservation>>;

    /// Reservations on one date, soonest first.
    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        self.find_between(date, date).await
    }

    /// Sum of party sizes in `area` on dates within `[start, end]`.
    async fn reserved_seats_between(
        &self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64>;

    /// Whether reservation `id` exists and is owned by `user_id`.
    async fn exists_for_user(&self, id: ReservationId, user_id: UserId) -> AppResult<bool>;
}

/// One unit of work against the store.
///
/// Dropping a transaction without calling [`ReservationTx::commit`] rolls
/// every change back.
#[async_trait]
pub trait ReservationTx: Send {
    /// Take exclusive locks on the given buckets until commit or rollback.
    ///
    /// Implementations sort and deduplicate the buckets so concurrent
    /// transactions always lock in the same order.
    async fn lock_buckets(&mut self, buckets: &[Bucket]) -> AppResult<()>;

    /// Load a reservation and lock it against concurrent writers.
    async fn find_for_update(&mut self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// Sum of party sizes in `area` on dates within `[start, end]`, as seen
    /// by this transaction.
    async fn reserved_seats_between(
        &mut self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64>;

    /// Insert a reservation and return it with its assigned id.
    async fn insert(&mut self, new: &NewReservation) -> AppResult<Reservation>;

    /// Persist the mutable fields of an existing reservation.
    async fn update(&mut self, reservation: &Reservation) -> AppResult<Reservation>;

    /// Physically delete a reservation. Returns `true` if it existed.
    async fn delete(&mut self, id: ReservationId) -> AppResult<bool>;

    /// Make every change visible atomically.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Lookup into the user directory, used when a reservation is created.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Resolve a user id, or `None` if no such user exists.
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<User>>;
}

/// Sort and deduplicate buckets into lock order.
pub(crate) fn lock_order(buckets: &[Bucket]) -> Vec<Bucket> {
    let mut ordered = buckets.to_vec();
    ordered.sort();
    ordered.dedup();
    ordered
}
