//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type. Each variant maps to an HTTP
//! status code and a structured JSON failure body that clients can branch
//! on without parsing the message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EventStatus;

/// Structured JSON failure body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "message": "event is not pending approval (current status: approved)",
///   "error": { "code": 2101, "kind": "not_pending" }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for failures.
    pub success: bool,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable classification.
    pub error: ErrorBody,
}

/// Numeric code and stable kind string for a failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Stable snake_case identifier of the variant.
    pub kind: &'static str,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                 | HTTP Status         |
/// |-----------|--------------------------|---------------------|
/// | 1000–1999 | Validation               | 400 Bad Request     |
/// | 2000–2099 | Not found                | 404 Not Found       |
/// | 2100–2999 | State conflicts          | 409 Conflict        |
/// | 3000–3999 | Server                   | 500 / 503           |
/// | 4000–4999 | Authentication / access  | 401 / 403           |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request validation failed (missing or malformed field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(uuid::Uuid),

    /// Approve, reject or cancel attempted on an event that is not pending.
    #[error("event is not pending approval (current status: {0})")]
    NotPending(EventStatus),

    /// Registration operation attempted on an event that is not approved.
    #[error("event is not approved (current status: {0})")]
    NotApproved(EventStatus),

    /// Lifecycle transition not permitted from the current status.
    #[error("cannot {action} an event in status {from}")]
    InvalidTransition {
        /// Status the event was in.
        from: EventStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Event reached its attendee capacity.
    #[error("event is full ({0} attendees)")]
    EventFull(u32),

    /// Registration for the event is closed.
    #[error("registration is closed for this event")]
    RegistrationClosed,

    /// The user is already registered for the event.
    #[error("user is already registered for this event")]
    AlreadyRegistered,

    /// The user holds no registration for the event.
    #[error("user is not registered for this event")]
    NotRegistered,

    /// An attendance record already exists for the user and event.
    #[error("attendance already recorded for user {0}")]
    DuplicateAttendance(uuid::Uuid),

    /// An account with this email already exists.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Missing, malformed or expired bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Email/password pair did not match an account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Caller lacks the role or ownership required.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A dependency required by the request is not configured.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::NotPending(_) => 2101,
            Self::NotApproved(_) => 2102,
            Self::InvalidTransition { .. } => 2103,
            Self::EventFull(_) => 2104,
            Self::RegistrationClosed => 2105,
            Self::AlreadyRegistered => 2106,
            Self::NotRegistered => 2107,
            Self::DuplicateAttendance(_) => 2108,
            Self::EmailTaken(_) => 2109,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::ServiceUnavailable(_) => 3002,
            Self::Unauthorized(_) => 4001,
            Self::InvalidCredentials => 4002,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the stable snake_case kind string for this variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::EventNotFound(_) => "event_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::NotPending(_) => "not_pending",
            Self::NotApproved(_) => "not_approved",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::EventFull(_) => "event_full",
            Self::RegistrationClosed => "registration_closed",
            Self::AlreadyRegistered => "already_registered",
            Self::NotRegistered => "not_registered",
            Self::DuplicateAttendance(_) => "duplicate_attendance",
            Self::EmailTaken(_) => "email_taken",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Forbidden(_) => "forbidden",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Persistence(_) => "persistence_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotPending(_)
            | Self::NotApproved(_)
            | Self::InvalidTransition { .. }
            | Self::EventFull(_)
            | Self::RegistrationClosed
            | Self::AlreadyRegistered
            | Self::NotRegistered
            | Self::DuplicateAttendance(_)
            | Self::EmailTaken(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
