//! Request context carrying the identity of the caller.

use serde::{Deserialize, Serialize};

use tablebook_core::types::UserId;
use tablebook_entity::user::{User, UserRole};

/// Who is acting on the current request.
///
/// Built by the (external) authentication layer and handed to
/// [`crate::ReservationAccess`] before any engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role.
    pub role: UserRole,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for RequestContext {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}
