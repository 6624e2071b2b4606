//! Request extractors: the authenticated [`Actor`] and a JSON body whose
//! rejections surface as [`ServiceError::Validation`].

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::app_state::AppState;
use crate::domain::Actor;
use crate::error::ServiceError;

impl FromRequestParts<AppState> for Actor {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.auth_service.authenticate(token).await
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ServiceError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("malformed authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("expected a bearer token".to_string()))
}

/// JSON body extractor reporting malformed input in the service's failure
/// shape instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> ServiceError {
    ServiceError::Validation(rejection.body_text())
}

/// Parses an optional JSON body: an empty body yields `T::default()`.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] if a non-empty body is not valid
/// JSON for `T`.
pub fn optional_json<T>(body: &[u8]) -> Result<T, ServiceError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ServiceError::Validation(format!("invalid JSON body: {e}")))
}
