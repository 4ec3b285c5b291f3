//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

use tablebook_core::config::ReservationConfig;
use tablebook_core::error::AppError;
use tablebook_core::result::AppResult;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_database::store::{ReservationStore, ReservationTx};
use tablebook_database::{MemoryReservationStore, MemoryUserDirectory};
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};
use tablebook_entity::user::{User, UserRole};
use tablebook_service::{
    FixedClock, ReservationAccess, ReservationRequest, ReservationService,
};

/// Regular guest.
pub const ALICE: UserId = UserId(1);
/// Another regular guest.
pub const BOB: UserId = UserId(2);
/// Restaurant staff.
pub const ADMIN: UserId = UserId(9);

/// Reservation date used by most scenarios.
pub fn dec1() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

/// Shorthand for a minute-precision time.
pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// The moment every test starts at: well before `dec1()`.
pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 20)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// A dinner request on `dec1()`.
pub fn dinner(party_size: i32, area: &str) -> ReservationRequest {
    ReservationRequest::new(dec1(), hm(20, 0), party_size, area)
}

/// Test engine over the in-memory store with a controllable clock.
pub struct TestEngine {
    /// The engine under test.
    pub service: ReservationService,
    /// Capability checks over the same store.
    pub access: ReservationAccess,
    /// The store, for inspecting committed state.
    pub store: Arc<dyn ReservationStore>,
    /// Clock shared with the engine.
    pub clock: Arc<FixedClock>,
}

impl TestEngine {
    /// Engine with default rules over a fresh in-memory store.
    pub async fn new() -> Self {
        Self::with_config(ReservationConfig::default()).await
    }

    /// Engine with custom rules over a fresh in-memory store.
    pub async fn with_config(config: ReservationConfig) -> Self {
        Self::with_store(Arc::new(MemoryReservationStore::new()), config).await
    }

    /// Engine over any store.
    pub async fn with_store(store: Arc<dyn ReservationStore>, config: ReservationConfig) -> Self {
        let users = MemoryUserDirectory::new();
        for (id, first, role) in [
            (ALICE, "Alice", UserRole::User),
            (BOB, "Bob", UserRole::User),
            (ADMIN, "Admin", UserRole::Admin),
        ] {
            users
                .insert(User {
                    id,
                    first_name: first.to_string(),
                    last_name: "Test".to_string(),
                    email: format!("{}@example.com", first.to_lowercase()),
                    role,
                    created_at: Utc::now(),
                })
                .await;
        }

        let clock = Arc::new(FixedClock::new(start_time()));
        let service = ReservationService::new(store.clone(), Arc::new(users), clock.clone(), &config);
        let access = ReservationAccess::new(store.clone());

        Self {
            service,
            access,
            store,
            clock,
        }
    }

    /// Create a reservation that must succeed.
    pub async fn book(&self, user: UserId, request: ReservationRequest) -> Reservation {
        self.service
            .create_reservation(user, request)
            .await
            .expect("booking should succeed")
    }

    /// Committed seats in `area` on `date`.
    pub async fn reserved(&self, area: Area, date: NaiveDate) -> i64 {
        self.store
            .reserved_seats_between(area, date, date)
            .await
            .unwrap()
    }
}

/// Store wrapper whose commits fail with a transaction conflict a given
/// number of times before behaving normally.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryReservationStore,
    failures_left: Arc<AtomicU32>,
    begins: AtomicU32,
    /// Reject every insert the way a foreign-key violation on `user_id` is
    /// reported.
    owners_gone: bool,
}

impl FlakyStore {
    /// Fail the next `failures` commits.
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemoryReservationStore::new(),
            failures_left: Arc::new(AtomicU32::new(failures)),
            begins: AtomicU32::new(0),
            owners_gone: false,
        }
    }

    /// A store in which every owner was deleted after being looked up.
    pub fn with_owners_gone() -> Self {
        Self {
            owners_gone: true,
            ..Self::new(0)
        }
    }

    /// How many transactions were opened.
    pub fn begins(&self) -> u32 {
        self.begins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReservationStore for FlakyStore {
    async fn begin(&self) -> AppResult<Box<dyn ReservationTx>> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FlakyTx {
            inner: self.inner.begin().await?,
            failures_left: self.failures_left.clone(),
            owners_gone: self.owners_gone,
        }))
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        self.inner.find_all().await
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        self.inner.find_by_user(user_id).await
    }

    async fn find_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Reservation>> {
        self.inner.find_between(start, end).await
    }

    async fn reserved_seats_between(
        &self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        self.inner.reserved_seats_between(area, start, end).await
    }

    async fn exists_for_user(&self, id: ReservationId, user_id: UserId) -> AppResult<bool> {
        self.inner.exists_for_user(id, user_id).await
    }
}

struct FlakyTx {
    inner: Box<dyn ReservationTx>,
    failures_left: Arc<AtomicU32>,
    owners_gone: bool,
}

#[async_trait]
impl ReservationTx for FlakyTx {
    async fn lock_buckets(&mut self, buckets: &[Bucket]) -> AppResult<()> {
        self.inner.lock_buckets(buckets).await
    }

    async fn find_for_update(&mut self, id: ReservationId) -> AppResult<Option<Reservation>> {
        self.inner.find_for_update(id).await
    }

    async fn reserved_seats_between(
        &mut self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        self.inner.reserved_seats_between(area, start, end).await
    }

    async fn insert(&mut self, new: &NewReservation) -> AppResult<Reservation> {
        if self.owners_gone {
            return Err(AppError::not_found(format!(
                "Failed to insert reservation: user {} does not exist",
                new.user_id
            )));
        }
        self.inner.insert(new).await
    }

    async fn update(&mut self, reservation: &Reservation) -> AppResult<Reservation> {
        self.inner.update(reservation).await
    }

    async fn delete(&mut self, id: ReservationId) -> AppResult<bool> {
        self.inner.delete(id).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            // Dropping the inner transaction rolls it back.
            return Err(AppError::transaction_conflict(
                "could not serialize access due to concurrent update",
            ));
        }
        self.inner.commit().await
    }
}
