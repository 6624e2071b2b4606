//! Account handlers: register, login, current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::Actor;
use crate::error::{ErrorResponse, ServiceError};

/// `POST /auth/register` — Create a student account.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] or [`ServiceError::EmailTaken`].
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Register an account",
    description = "Creates a student account and returns a bearer token for it.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid name, email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (user, token) = state
        .auth_service
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, token))))
}

/// `POST /auth/login` — Exchange credentials for a token.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidCredentials`] on mismatch.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies email and password and returns a fresh bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (user, token) = state.auth_service.login(&req.email, &req.password).await?;
    Ok(Json(AuthResponse::new(&user, token)))
}

/// `GET /auth/me` — The authenticated account.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    summary = "Current user",
    description = "Returns the account behind the bearer token, including its current role.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.auth_service.users().get(actor.user_id).await?;
    Ok(Json(UserDto::from(&user)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
