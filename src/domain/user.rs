//! User accounts, roles, and the authenticated request actor.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use crate::error::ServiceError;

/// Role of a user account.
///
/// Students become organizers when their first event is approved. Admins
/// review proposals and may act on any event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Default role for self-registered accounts.
    Student,
    /// Student with at least one approved event.
    Organizer,
    /// Reviewer with full control over events.
    Admin,
}

impl Role {
    /// Returns the role as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account held in the [`super::UserDirectory`].
#[derive(Debug, Clone)]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lower-cased email address, unique across accounts.
    pub email: String,
    /// Current role.
    pub role: Role,
    /// Argon2id hash of the password in PHC string format.
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller of a request.
///
/// Built per request from the bearer token subject and the role currently
/// stored in the directory, so promotions apply to the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller's account ID.
    pub user_id: UserId,
    /// Caller's role at the time of the request.
    pub role: Role,
}

impl Actor {
    /// Creates an actor from a user ID and role.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns `true` if the caller is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with [`ServiceError::Forbidden`] unless the caller is an admin.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for non-admin callers.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("admin role required".to_string()))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}
