//! Proposal handlers: create, list own, edit, submit, cancel submission.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    CreateEventRequest, EventActionResponse, EventCollectionResponse, ProposalListQuery,
    UpdateEventRequest,
};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{Actor, EventId, NewEvent};
use crate::error::{ErrorResponse, ServiceError};

/// `POST /events/proposals` — Create a draft proposal.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] for missing or invalid fields.
#[utoipa::path(
    post,
    path = "/api/events/proposals",
    tag = "Proposals",
    summary = "Create a proposal",
    description = "Stores a new event in `draft` status owned by the caller.",
    security(("bearer" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Draft created", body = EventActionResponse),
        (status = 400, description = "Invalid proposal", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn create_proposal(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let new = NewEvent::try_from(req)?;
    let event = state.event_service.create_proposal(&actor, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(EventActionResponse::new("Proposal created", &event)),
    ))
}

/// `GET /events/proposals/mine` — The caller's proposals in any status.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/events/proposals/mine",
    tag = "Proposals",
    summary = "List own proposals",
    description = "Returns every event the caller created, ordered by date, optionally filtered by status.",
    security(("bearer" = [])),
    params(ProposalListQuery),
    responses(
        (status = 200, description = "Caller's events", body = EventCollectionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_own_proposals(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ProposalListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let events = state.event_service.list_own(&actor, query.status).await;
    Ok(Json(EventCollectionResponse::new(&events)))
}

/// `PUT /events/proposals/{id}` — Edit a draft.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidTransition`] unless the event is a draft.
#[utoipa::path(
    put,
    path = "/api/events/proposals/{id}",
    tag = "Proposals",
    summary = "Edit a draft",
    description = "Applies a partial update to a draft. Only the creator may edit, and only before submission.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Draft updated", body = EventActionResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 403, description = "Caller is not the creator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not a draft", body = ErrorResponse),
    )
)]
pub async fn update_proposal(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .update_proposal(&actor, EventId::from_uuid(id), req.into())
        .await?;
    Ok(Json(EventActionResponse::new("Proposal updated", &event)))
}

/// `POST /events/proposals/{id}/submit` — `draft → pending`.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidTransition`] unless the event is a draft.
#[utoipa::path(
    post,
    path = "/api/events/proposals/{id}/submit",
    tag = "Proposals",
    summary = "Submit for approval",
    description = "Moves a draft to `pending` so admins can review it. Creator only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Submitted", body = EventActionResponse),
        (status = 403, description = "Caller is not the creator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not a draft", body = ErrorResponse),
    )
)]
pub async fn submit_proposal(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .submit_proposal(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new(
        "Proposal submitted for approval",
        &event,
    )))
}

/// `PUT /events/proposals/{id}/cancel-submission` — `pending → draft`.
///
/// # Errors
///
/// Returns [`ServiceError::NotPending`] unless the event is pending.
#[utoipa::path(
    put,
    path = "/api/events/proposals/{id}/cancel-submission",
    tag = "Proposals",
    summary = "Cancel submission",
    description = "Withdraws a pending proposal back to `draft`. Creator only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Back to draft", body = EventActionResponse),
        (status = 403, description = "Caller is not the creator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not pending", body = ErrorResponse),
    )
)]
pub async fn cancel_submission(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .cancel_submission(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new("Submission cancelled", &event)))
}

/// Proposal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/proposals", post(create_proposal))
        .route("/events/proposals/mine", get(list_own_proposals))
        .route("/events/proposals/{id}", put(update_proposal))
        .route("/events/proposals/{id}/submit", post(submit_proposal))
        .route(
            "/events/proposals/{id}/cancel-submission",
            put(cancel_submission),
        )
}
