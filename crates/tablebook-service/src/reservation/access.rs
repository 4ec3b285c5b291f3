//! Capability checks run before the engine is invoked.

use std::sync::Arc;

use tracing::debug;

use tablebook_core::types::{ReservationId, UserId};
use tablebook_database::store::ReservationStore;

use super::error::ReservationError;
use crate::context::RequestContext;

/// Decides whether a caller may act on a reservation or on a user's
/// reservations. Admins may act on anything; everyone else only on what
/// they own.
#[derive(Debug, Clone)]
pub struct ReservationAccess {
    /// Store used for ownership lookups.
    store: Arc<dyn ReservationStore>,
}

impl ReservationAccess {
    /// Creates a new access checker.
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Allows admins and the owner of reservation `id`.
    ///
    /// A non-admin asking for a reservation that does not exist is refused
    /// the same way as one asking for somebody else's, so ids of other
    /// users' reservations cannot be probed.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> Result<(), ReservationError> {
        if ctx.is_admin() || self.store.exists_for_user(id, ctx.user_id).await? {
            return Ok(());
        }

        debug!(user_id = %ctx.user_id, reservation_id = %id, "Reservation access denied");
        Err(ReservationError::Forbidden {
            target: format!("reservation {id}"),
        })
    }

    /// Allows admins and `user_id` itself to create or list reservations
    /// owned by `user_id`.
    pub fn authorize_owner_of(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<(), ReservationError> {
        if ctx.is_admin() || ctx.user_id == user_id {
            return Ok(());
        }

        debug!(user_id = %ctx.user_id, target_user = %user_id, "User access denied");
        Err(ReservationError::Forbidden {
            target: format!("reservations of user {user_id}"),
        })
    }
}
