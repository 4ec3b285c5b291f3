//! Reservation repository implementation.
//!
//! Every query is written against a generic [`PgExecutor`] so the same SQL
//! runs on the pool for plain reads and on an open transaction inside the
//! store's unit of work.

use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use tablebook_core::result::AppResult;
use tablebook_core::types::{ReservationId, UserId};
use tablebook_entity::reservation::{Area, Bucket, NewReservation, Reservation};

use crate::error::map_sqlx;

/// High half of the two-key advisory lock used for reservation buckets.
/// The area ordinal is added to it so each area gets its own lock class.
const BUCKET_LOCK_CLASS: i32 = 0x7AB1_E000;

/// Repository for reservation CRUD and occupancy queries.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the pool this repository reads from.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a reservation by primary key.
    pub async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        find_by_id(&self.pool, id).await
    }

    /// List every reservation, soonest first.
    pub async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM table_reservations \
             ORDER BY reservation_date, reservation_time, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list reservations", e))
    }

    /// List the reservations owned by a user, soonest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM table_reservations WHERE user_id = $1 \
             ORDER BY reservation_date, reservation_time, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list reservations by user", e))
    }

    /// List the reservations whose date falls in `[start, end]`.
    pub async fn find_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM table_reservations \
             WHERE reservation_date BETWEEN $1 AND $2 \
             ORDER BY reservation_date, reservation_time, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list reservations by date", e))
    }

    /// Seats reserved in `area` on dates within `[start, end]`.
    pub async fn reserved_seats_between(
        &self,
        area: Area,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<i64> {
        reserved_seats_between(&self.pool, area, start, end).await
    }

    /// Whether reservation `id` exists and belongs to `user_id`.
    pub async fn exists_for_user(&self, id: ReservationId, user_id: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM table_reservations WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to check reservation ownership", e))
    }
}

/// Find a reservation by primary key.
pub async fn find_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: ReservationId,
) -> AppResult<Option<Reservation>> {
    sqlx::query_as::<_, Reservation>("SELECT * FROM table_reservations WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_sqlx("Failed to find reservation by id", e))
}

/// Find a reservation and lock its row until the transaction ends.
pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: ReservationId,
) -> AppResult<Option<Reservation>> {
    sqlx::query_as::<_, Reservation>("SELECT * FROM table_reservations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_sqlx("Failed to lock reservation", e))
}

/// Sum of party sizes in `area` on dates within `[start, end]`; zero when
/// there are none.
pub async fn reserved_seats_between<'e, E: PgExecutor<'e>>(
    executor: E,
    area: Area,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(number_of_people), 0)::BIGINT FROM table_reservations \
         WHERE area = $1 AND reservation_date BETWEEN $2 AND $3",
    )
    .bind(area)
    .bind(start)
    .bind(end)
    .fetch_one(executor)
    .await
    .map_err(|e| map_sqlx("Failed to count reserved seats", e))
}

/// Insert a reservation and return the stored row.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    new: &NewReservation,
) -> AppResult<Reservation> {
    sqlx::query_as::<_, Reservation>(
        "INSERT INTO table_reservations \
             (reservation_date, reservation_time, number_of_people, area, user_id) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.reservation_date)
    .bind(new.reservation_time)
    .bind(new.party_size)
    .bind(new.area)
    .bind(new.user_id)
    .fetch_one(executor)
    .await
    .map_err(|e| map_sqlx("Failed to insert reservation", e))
}

/// Overwrite the mutable fields of a reservation and bump `updated_at`.
pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    reservation: &Reservation,
) -> AppResult<Option<Reservation>> {
    sqlx::query_as::<_, Reservation>(
        "UPDATE table_reservations SET \
             reservation_date = $2, \
             reservation_time = $3, \
             number_of_people = $4, \
             area = $5, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(reservation.id)
    .bind(reservation.reservation_date)
    .bind(reservation.reservation_time)
    .bind(reservation.party_size)
    .bind(reservation.area)
    .fetch_optional(executor)
    .await
    .map_err(|e| map_sqlx("Failed to update reservation", e))
}

/// Physically delete a reservation. Returns `true` if a row was removed.
pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: ReservationId) -> AppResult<bool> {
    sqlx::query("DELETE FROM table_reservations WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|e| map_sqlx("Failed to delete reservation", e))
}

/// Take the transaction-scoped advisory lock guarding one bucket.
pub async fn lock_bucket<'e, E: PgExecutor<'e>>(executor: E, bucket: Bucket) -> AppResult<()> {
    let (class, key) = bucket_lock_keys(bucket);
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(class)
        .bind(key)
        .execute(executor)
        .await
        .map(|_| ())
        .map_err(|e| map_sqlx("Failed to lock reservation bucket", e))
}

/// Bound how long the current transaction waits on any lock.
pub async fn set_lock_timeout<'e, E: PgExecutor<'e>>(executor: E, millis: u64) -> AppResult<()> {
    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(millis.to_string())
        .execute(executor)
        .await
        .map(|_| ())
        .map_err(|e| map_sqlx("Failed to set lock timeout", e))
}

/// The two 32-bit keys identifying a bucket's advisory lock.
pub fn bucket_lock_keys(bucket: Bucket) -> (i32, i32) {
    use chrono::Datelike;
    (
        BUCKET_LOCK_CLASS + bucket.area.ordinal(),
        bucket.date.num_days_from_ce(),
    )
}
