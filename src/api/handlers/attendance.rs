//! Attendance handlers: staff check-in and attendance lookups.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    AttendanceDto, AttendanceListResponse, AttendanceLookupResponse, CheckInRequest,
    CheckInResponse,
};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::{Actor, EventId, UserId};
use crate::error::{ErrorResponse, ServiceError};

/// `POST /events/{id}/attendance` — Check an attendee in.
///
/// # Errors
///
/// Returns [`ServiceError::DuplicateAttendance`] if the attendee already
/// checked in, plus the lookup and permission errors of
/// [`crate::service::EventService::check_in`].
#[utoipa::path(
    post,
    path = "/api/events/{id}/attendance",
    tag = "Attendance",
    summary = "Check in an attendee",
    description = "Records that a user is present and classifies the check-in as `early` (more than 2h before the start), `late` (more than 1h after) or `on_time`. Creator or admin only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = CheckInResponse),
        (status = 403, description = "Caller is neither creator nor admin", body = ErrorResponse),
        (status = 404, description = "Event or user not found", body = ErrorResponse),
        (status = 409, description = "Already checked in or event not approved", body = ErrorResponse),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<CheckInRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .event_service
        .check_in(&actor, EventId::from_uuid(id), req.user_id, req.check_in_time)
        .await?;
    Ok((StatusCode::CREATED, Json(CheckInResponse::from(&record))))
}

/// `GET /events/{id}/attendance` — All attendance records of an event.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/events/{id}/attendance",
    tag = "Attendance",
    summary = "List attendance",
    description = "Returns every check-in for the event ordered by check-in time. Creator or admin only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Attendance records", body = AttendanceListResponse),
        (status = 403, description = "Caller is neither creator nor admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event_id = EventId::from_uuid(id);
    let records = state
        .event_service
        .list_attendance(&actor, event_id)
        .await?;
    Ok(Json(AttendanceListResponse {
        event_id,
        total: records.len(),
        data: records.iter().map(AttendanceDto::from).collect(),
    }))
}

/// `GET /events/{id}/attendance/{user_id}` — One attendee's record.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`], or [`ServiceError::Forbidden`]
/// when a non-staff caller asks about someone else.
#[utoipa::path(
    get,
    path = "/api/events/{id}/attendance/{user_id}",
    tag = "Attendance",
    summary = "Get one attendance record",
    description = "Tells whether a user has checked in. Attendees may look up their own record; staff may look up anyone.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("user_id" = uuid::Uuid, Path, description = "Attendee UUID"),
    ),
    responses(
        (status = 200, description = "Attendance status", body = AttendanceLookupResponse),
        (status = 403, description = "Not visible to caller", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn find_attendance(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, user_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .event_service
        .find_attendance(&actor, EventId::from_uuid(id), UserId::from_uuid(user_id))
        .await?;
    Ok(Json(AttendanceLookupResponse {
        checked_in: record.is_some(),
        attendance: record.as_ref().map(AttendanceDto::from),
    }))
}

/// Attendance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{id}/attendance",
            get(list_attendance).post(check_in),
        )
        .route("/events/{id}/attendance/{user_id}", get(find_attendance))
}
