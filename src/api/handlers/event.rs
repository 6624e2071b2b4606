//! Event handlers: catalogue, detail, delete, registration toggles, and
//! attendee registration.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    DeleteEventResponse, EventActionResponse, EventDetailResponse, EventDto, EventListQuery,
    EventListResponse, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::{Actor, EventId};
use crate::error::{ErrorResponse, ServiceError};

/// `GET /events` — Approved catalogue with pagination and category filter.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    summary = "List approved events",
    description = "Returns a paginated list of approved events ordered by date, optionally filtered by category.",
    security(("bearer" = [])),
    params(EventListQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<EventListQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let events = state.event_service.list_approved(query.category).await;
    let (page, pagination) = params.paginate(events);
    Ok(Json(EventListResponse {
        data: page.iter().map(EventDto::from).collect(),
        pagination,
    }))
}

/// `GET /events/{id}` — Event detail.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`], or [`ServiceError::Forbidden`]
/// for a non-approved event the caller neither created nor administers.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Get event details",
    description = "Returns a single event and whether the caller is registered for it.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDetailResponse),
        (status = 403, description = "Event not visible to caller", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let (event, is_registered) = state
        .event_service
        .get_event(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventDetailResponse {
        seats_left: event.seats_left(),
        accepting_registrations: event.accepts_registrations(),
        event: EventDto::from(&event),
        is_registered,
    }))
}

/// `DELETE /events/{id}` — Delete an event with its registrations and
/// attendance.
///
/// # Errors
///
/// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Removes the event in any status together with its registrations and attendance records. Creator or admin only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event deleted", body = DeleteEventResponse),
        (status = 403, description = "Caller is neither creator nor admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let removed = state
        .event_service
        .delete_event(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(DeleteEventResponse::from(&removed)))
}

/// `PATCH /events/{id}/close-registration` — Stop accepting registrations.
///
/// # Errors
///
/// Returns [`ServiceError::NotApproved`] unless the event is approved.
#[utoipa::path(
    patch,
    path = "/api/events/{id}/close-registration",
    tag = "Events",
    summary = "Close registration",
    description = "Sets `registrationClosed` and `closedAt` on an approved event. Creator or admin only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Registration closed", body = EventActionResponse),
        (status = 403, description = "Caller is neither creator nor admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not approved", body = ErrorResponse),
    )
)]
pub async fn close_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .close_registration(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new("Registration closed", &event)))
}

/// `PATCH /events/{id}/open-registration` — Resume registrations.
///
/// # Errors
///
/// Returns [`ServiceError::NotApproved`] unless the event is approved.
#[utoipa::path(
    patch,
    path = "/api/events/{id}/open-registration",
    tag = "Events",
    summary = "Open registration",
    description = "Clears `registrationClosed` and `closedAt` on an approved event. Creator or admin only.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Registration opened", body = EventActionResponse),
        (status = 403, description = "Caller is neither creator nor admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event is not approved", body = ErrorResponse),
    )
)]
pub async fn open_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .open_registration(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new("Registration opened", &event)))
}

/// `POST /events/{id}/register` — Register the caller.
///
/// # Errors
///
/// Returns [`ServiceError::NotApproved`], [`ServiceError::RegistrationClosed`],
/// [`ServiceError::EventFull`] or [`ServiceError::AlreadyRegistered`].
#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    tag = "Events",
    summary = "Register for an event",
    description = "Takes one seat on an approved event with open registration. The capacity check and the increment are a single atomic step.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Registered", body = EventActionResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Not approved, closed, full or already registered", body = ErrorResponse),
    )
)]
pub async fn register_attendee(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .register_attendee(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new(
        "Registered for event",
        &event,
    )))
}

/// `DELETE /events/{id}/register` — Withdraw the caller's registration.
///
/// # Errors
///
/// Returns [`ServiceError::NotRegistered`] if the caller holds no seat.
#[utoipa::path(
    delete,
    path = "/api/events/{id}/register",
    tag = "Events",
    summary = "Unregister from an event",
    description = "Releases the caller's seat.",
    security(("bearer" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Unregistered", body = EventActionResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Caller is not registered", body = ErrorResponse),
    )
)]
pub async fn unregister_attendee(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let event = state
        .event_service
        .unregister_attendee(&actor, EventId::from_uuid(id))
        .await?;
    Ok(Json(EventActionResponse::new(
        "Registration withdrawn",
        &event,
    )))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event).delete(delete_event))
        .route(
            "/events/{id}/close-registration",
            patch(close_registration),
        )
        .route("/events/{id}/open-registration", patch(open_registration))
        .route(
            "/events/{id}/register",
            post(register_attendee).delete(unregister_attendee),
        )
}
