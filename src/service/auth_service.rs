//! Account registration, login, and bearer-token validation.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, Role, User, UserDirectory, UserId};
use crate::error::ServiceError;

const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound on the access token lifetime (30 days).
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account ID.
    pub sub: uuid::Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and validates HS256 access tokens against the user directory.
///
/// Tokens only carry the account ID. The role is read from the directory
/// on every request, so a promotion is visible without a new token.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserDirectory>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: TimeDelta,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("users", &self.users)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a new `AuthService` signing tokens with `secret`.
    ///
    /// `token_ttl_secs` is capped at [`MAX_TOKEN_TTL_SECS`].
    #[must_use]
    pub fn new(users: Arc<UserDirectory>, secret: &str, token_ttl_secs: u64) -> Self {
        let capped = token_ttl_secs.min(MAX_TOKEN_TTL_SECS);
        if capped < token_ttl_secs {
            tracing::warn!(
                requested = token_ttl_secs,
                max = MAX_TOKEN_TTL_SECS,
                "token TTL capped"
            );
        }
        let ttl = TimeDelta::try_seconds(i64::try_from(capped).unwrap_or(i64::MAX))
            .unwrap_or(TimeDelta::zero());
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: ttl,
        }
    }

    /// Effective access token lifetime.
    #[must_use]
    pub const fn token_ttl(&self) -> TimeDelta {
        self.token_ttl
    }

    /// Returns a reference to the inner [`UserDirectory`].
    #[must_use]
    pub fn users(&self) -> &Arc<UserDirectory> {
        &self.users
    }

    /// Creates a student account and returns it with a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a blank name, malformed
    /// email or short password, and [`ServiceError::EmailTaken`] if the
    /// email is in use. Returns [`ServiceError::Internal`] if hashing or
    /// token signing fails.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), ServiceError> {
        let user = self.new_user(name, email, password, Role::Student)?;
        let token = self.issue_token(user.id)?;
        self.users.insert(user.clone()).await?;
        tracing::info!(user_id = %user.id, "account registered");
        Ok((user, token))
    }

    /// Verifies credentials and returns the account with a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidCredentials`] if the email is unknown
    /// or the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ServiceError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await
            .ok_or(ServiceError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "failed login");
            return Err(ServiceError::InvalidCredentials);
        }
        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    /// Creates the bootstrap admin unless an account with that email
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid credentials.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, ServiceError> {
        if let Some(existing) = self.users.find_by_email(&normalize_email(email)).await {
            return Ok(existing.id);
        }
        let admin = self.new_user(name, email, password, Role::Admin)?;
        let id = self.users.insert(admin).await?;
        tracing::info!(user_id = %id, "bootstrap admin created");
        Ok(id)
    }

    /// Signs an access token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if the expiry is out of range or
    /// signing fails.
    pub fn issue_token(&self, user_id: UserId) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| ServiceError::Internal("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: *user_id.as_uuid(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("token signing failed: {e}")))
    }

    /// Validates a bearer token and resolves the caller's current role.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] for invalid or expired tokens
    /// and for tokens whose account no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<Actor, ServiceError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;
        let user = self
            .users
            .get(UserId::from_uuid(data.claims.sub))
            .await
            .map_err(|_| ServiceError::Unauthorized("account no longer exists".to_string()))?;
        Ok(Actor::from(&user))
    }

    fn new_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".to_string()));
        }
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(ServiceError::Validation(format!("invalid email: {email}")));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(User {
            id: UserId::new(),
            name: name.to_string(),
            email,
            role,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// Argon2id hash of the password with a random salt, in PHC string format.
fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|hash| {
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok()
    })
}
