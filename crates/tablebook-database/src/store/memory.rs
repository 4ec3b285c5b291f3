//! In-memory reservation store using a Tokio mutex for single-node
//! deployments and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use tablebook_core::error::AppError;
use tablebook_core::result::AppResult;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};
use tablebook_entity::user::User;

use super::{ReservationStore, ReservationTx, UserDirectory};

/// Committed rows, keyed by id.
#[derive(Debug, Clone, Default)]
struct InnerState {
    rows: BTreeMap<ReservationId, Reservation>,
}

impl InnerState {
    fn sorted(&self, mut keep: impl FnMut(&Reservation) -> bool) -> Vec<Reservation> {
        let mut rows: Vec<Reservation> = self.rows.values().filter(|r| keep(r)).cloned().collect();
        rows.sort_by_key(|r| (r.reservation_date, r.reservation_time, r.id));
        rows
    }

    fn reserved_seats(&self, area: Area, start: NaiveDate, end: NaiveDate) -> i64 {
        self.rows
            .values()
            .filter(|r| r.area == area && r.reservation_date >= start && r.reservation_date <= end)
            .map(|r| i64::from(r.party_size))
            .sum()
    }
}

/// In-memory reservation store.
///
/// A transaction holds the store-wide mutex for its whole lifetime and
/// works on a private copy of the rows, which replaces the committed state
/// on commit. Writers are therefore fully serialized, which trivially
/// keeps every bucket within capacity. Suitable for single-node
/// deployments only.
#[derive(Debug, Clone, Default)]
pub struct MemoryReservationStore {
    /// Protected committed state.
    state: Arc<Mutex<InnerState>>,
    /// Last assigned id; never rolled back.
    last_id: Arc<AtomicI64>,
}

impl MemoryReservationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed reservations.
    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    /// Whether the store holds no reservations.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn begin(&self) -> AppResult<Box<dyn ReservationTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryReservationTx {
            guard,
            staged,
            last_id: Arc::clone(&self.last_id),
        }))
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        Ok(self.state.lock().await.sorted(|_| true))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        Ok(self.state.lock().await.sorted(|r| r.user_id == user_id))
    }

    async fn find_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Reservation>> {
        Ok(self
            .state
            .lock()
            .await
            .sorted(|r| r.reservation_date >= start && r.reservation_date <= end))
    }

    async fn reserved_seats_between(
        &self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        Ok(self.state.lock().await.reserved_seats(area, start, end))
    }

    async fn exists_for_user(&self, id: ReservationId, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .rows
            .get(&id)
            .is_some_and(|r| r.user_id == user_id))
    }
}

/// Unit of work over [`MemoryReservationStore`].
#[derive(Debug)]
struct MemoryReservationTx {
    /// Exclusive access to the committed state.
    guard: OwnedMutexGuard<InnerState>,
    /// Changes made so far in this transaction.
    staged: InnerState,
    /// Shared id sequence.
    last_id: Arc<AtomicI64>,
}

#[async_trait]
impl ReservationTx for MemoryReservationTx {
    async fn lock_buckets(&mut self, _buckets: &[Bucket]) -> AppResult<()> {
        // The store-wide guard already excludes every other writer.
        Ok(())
    }

    async fn find_for_update(&mut self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.staged.rows.get(&id).cloned())
    }

    async fn reserved_seats_between(
        &mut self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        Ok(self.staged.reserved_seats(area, start, end))
    }

    async fn insert(&mut self, new: &NewReservation) -> AppResult<Reservation> {
        let id = ReservationId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let now = Utc::now();
        let reservation = Reservation {
            id,
            reservation_date: new.reservation_date,
            reservation_time: new.reservation_time,
            party_size: new.party_size,
            area: new.area,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        self.staged.rows.insert(id, reservation.clone());
        Ok(reservation)
    }

    async fn update(&mut self, reservation: &Reservation) -> AppResult<Reservation> {
        let row = self
            .staged
            .rows
            .get_mut(&reservation.id)
            .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", reservation.id)))?;

        row.reservation_date = reservation.reservation_date;
        row.reservation_time = reservation.reservation_time;
        row.party_size = reservation.party_size;
        row.area = reservation.area;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&mut self, id: ReservationId) -> AppResult<bool> {
        Ok(self.staged.rows.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryReservationTx {
            mut guard, staged, ..
        } = *self;
        debug!(rows = staged.rows.len(), "Committing in-memory reservation transaction");
        *guard = staged;
        Ok(())
    }
}

/// In-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn resolve_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
