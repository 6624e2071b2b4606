//! Account DTOs for registration, login and the current user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Role, User, UserId};

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address, unique per account.
    #[serde(default)]
    pub email: String,
    /// Password, at least eight characters.
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Current role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Success body for registration and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Always `true`.
    pub success: bool,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// The authenticated account.
    pub user: UserDto,
}

impl AuthResponse {
    /// Builds a success body for `user` and `token`.
    #[must_use]
    pub fn new(user: &User, token: String) -> Self {
        Self {
            success: true,
            token,
            user: UserDto::from(user),
        }
    }
}
