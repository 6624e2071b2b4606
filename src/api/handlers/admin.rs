//! Admin review handlers: pending queue, approve, reject, activity log.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::{
    ApprovalResponse, ApproveEventRequest, EventActionResponse, EventCollectionResponse, EventDto,
    RejectEventRequest,
};
use crate::api::extract::{ApiJson, optional_json};
use crate::app_state::AppState;
use crate::domain::{Actor, EventId};
use crate::error::{ErrorResponse, ServiceError};
use crate::persistence::models::StoredActivity;

/// Response body for `GET /admin/events/{id}/activity`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogResponse {
    /// Event the activity belongs to.
    pub event_id: uuid::Uuid,
    /// Recorded activity in insertion order.
    pub data: Vec<StoredActivity>,
}

/// `GET /admin/events/pending` — The review queue.
///
/// # Errors
///
/// Returns [`ServiceError::Forbidden`] for non-admins.
#[utoipa::path(
    get,
    path = "/api/admin/events/pending",
    tag = "Admin",
    summary = "List pending events",
    description = "Returns every event awaiting review, ordered by date.",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Pending events", body = EventCollectionResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
    )
)]
pub async fn list_pending(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, ServiceError> {
    let events = state.event_service.list_pending(&actor).await?;
    Ok(Json(EventCollectionResponse::new(&events)))
}

/// `PUT /admin/events/{id}/approve` — `pending → approved`.
///
/// # Errors
///
/// Returns [`ServiceError::NotPending`] unless the event is pending.
#[utoipa::path(
    put,
    path = "/api/admin/events/{id}/approve",
    tag = "Admin",
    summary = "Approve an event",
    description = "Publishes a pending event. A student creator is promoted to organizer. The request body is optional.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body(content = ApproveEventRequest, description = "Optional reviewer notes"),
    responses(
        (status = 200, description = "Approved", body = ApprovalResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not pending", body = ErrorResponse),
    )
)]
pub async fn approve_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let req: ApproveEventRequest = optional_json(&body)?;
    let approval = state
        .event_service
        .approve_event(&actor, EventId::from_uuid(id), req.notes)
        .await?;
    Ok(Json(ApprovalResponse {
        success: true,
        message: "Event approved".to_string(),
        event: EventDto::from(&approval.event),
        creator_promoted: approval.creator_promoted,
    }))
}

/// `PUT /admin/events/{id}/reject` — `pending → rejected`.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] for blank notes and
/// [`ServiceError::NotPending`] unless the event is pending.
#[utoipa::path(
    put,
    path = "/api/admin/events/{id}/reject",
    tag = "Admin",
    summary = "Reject an event",
    description = "Declines a pending event. Notes explaining the decision are required.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = RejectEventRequest,
    responses(
        (status = 200, description = "Rejected", body = EventActionResponse),
        (status = 400, description = "Notes missing", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not pending", body = ErrorResponse),
    )
)]
pub async fn reject_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<RejectEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .reject_event(&actor, EventId::from_uuid(id), &req.notes)
        .await?;
    Ok(Json(EventActionResponse::new("Event rejected", &event)))
}

/// `GET /admin/events/{id}/activity` — Persisted activity of one event.
///
/// # Errors
///
/// Returns [`ServiceError::ServiceUnavailable`] when persistence is
/// disabled.
#[utoipa::path(
    get,
    path = "/api/admin/events/{id}/activity",
    tag = "Admin",
    summary = "Event activity log",
    description = "Returns the recorded activity of an event, including events that were since deleted. Requires persistence to be enabled.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Activity log", body = ActivityLogResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 503, description = "Persistence disabled", body = ErrorResponse),
    )
)]
pub async fn event_activity(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    actor.require_admin()?;
    let log = state
        .activity_log
        .as_ref()
        .ok_or_else(|| ServiceError::ServiceUnavailable("activity log is disabled".to_string()))?;
    let data = log.load_activity(id).await?;
    Ok(Json(ActivityLogResponse { event_id: id, data }))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events/pending", get(list_pending))
        .route("/admin/events/{id}/approve", put(approve_event))
        .route("/admin/events/{id}/reject", put(reject_event))
        .route("/admin/events/{id}/activity", get(event_activity))
}
