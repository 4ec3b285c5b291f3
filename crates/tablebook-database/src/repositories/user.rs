//! User repository implementation.

use sqlx::PgPool;

use tablebook_core::result::AppResult;
use tablebook_core::types::UserId;
use tablebook_entity::user::{User, UserRole};

use crate::error::map_sqlx;

/// Repository for the user lookups the reservation core needs.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find user by id", e))
    }

    /// Insert a user and return the stored row.
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        role: UserRole,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, role) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to create user", e))
    }
}
