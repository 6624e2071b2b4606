//! Event DTOs for proposals, review, catalogue and registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{Event, EventId, EventPatch, EventStatus, NewEvent, RemovedEvent, UserId};
use crate::error::ServiceError;

/// Request body for `POST /events/proposals`.
///
/// Text fields default to empty so that a missing field is reported as a
/// validation failure naming it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event title.
    #[serde(default)]
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Scheduled start time (RFC 3339).
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Venue.
    #[serde(default)]
    pub location: String,
    /// Attendee capacity, at least 1.
    #[serde(default)]
    pub max_attendees: u32,
}

impl TryFrom<CreateEventRequest> for NewEvent {
    type Error = ServiceError;

    fn try_from(req: CreateEventRequest) -> Result<Self, Self::Error> {
        let date = req
            .date
            .ok_or_else(|| ServiceError::Validation("date is required".to_string()))?;
        Ok(Self {
            title: req.title,
            description: req.description,
            category: req.category,
            date,
            location: req.location,
            max_attendees: req.max_attendees,
        })
    }
}

/// Request body for `PUT /events/proposals/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New scheduled start time.
    pub date: Option<DateTime<Utc>>,
    /// New venue.
    pub location: Option<String>,
    /// New capacity.
    pub max_attendees: Option<u32>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            date: req.date,
            location: req.location,
            max_attendees: req.max_attendees,
        }
    }
}

/// Request body for `PUT /admin/events/{id}/approve`. The body itself is
/// optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveEventRequest {
    /// Optional reviewer notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `PUT /admin/events/{id}/reject`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectEventRequest {
    /// Reason for rejection; must not be blank.
    #[serde(default)]
    pub notes: String,
}

/// Query parameters for `GET /events`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Case-insensitive category filter.
    pub category: Option<String>,
}

/// Query parameters for `GET /events/proposals/mine`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProposalListQuery {
    /// Restrict to one status.
    pub status: Option<EventStatus>,
}

/// An event document as returned by every endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Scheduled start time.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Attendee capacity.
    pub max_attendees: u32,
    /// Registered attendees.
    pub current_attendees: u32,
    /// Approval status.
    pub status: EventStatus,
    /// Whether registration is closed.
    pub registration_closed: bool,
    /// When registration was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Reviewer notes.
    pub approval_notes: Option<String>,
    /// Proposing account.
    pub creator_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Reviewing admin.
    pub reviewed_by: Option<UserId>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<&Event> for EventDto {
    fn from(ev: &Event) -> Self {
        Self {
            id: ev.id,
            title: ev.title.clone(),
            description: ev.description.clone(),
            category: ev.category.clone(),
            date: ev.date,
            location: ev.location.clone(),
            max_attendees: ev.max_attendees,
            current_attendees: ev.current_attendees,
            status: ev.status,
            registration_closed: ev.registration_closed,
            closed_at: ev.closed_at,
            approval_notes: ev.approval_notes.clone(),
            creator_id: ev.creator_id,
            created_at: ev.created_at,
            updated_at: ev.updated_at,
            submitted_at: ev.submitted_at,
            reviewed_by: ev.reviewed_by,
            reviewed_at: ev.reviewed_at,
        }
    }
}

/// Response body for `GET /events/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    /// The event.
    #[serde(flatten)]
    pub event: EventDto,
    /// Whether the caller is registered.
    pub is_registered: bool,
    /// Seats still available.
    pub seats_left: u32,
    /// Whether a registration would currently be accepted.
    pub accepting_registrations: bool,
}

/// Paginated list response for event listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Unpaginated list response for the caller's proposals and the admin
/// queue.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventCollectionResponse {
    /// Number of events.
    pub total: usize,
    /// The events.
    pub data: Vec<EventDto>,
}

impl EventCollectionResponse {
    /// Wraps a list of events.
    #[must_use]
    pub fn new(events: &[Event]) -> Self {
        Self {
            total: events.len(),
            data: events.iter().map(EventDto::from).collect(),
        }
    }
}

/// Success body for every state transition.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventActionResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The event after the transition.
    pub event: EventDto,
}

impl EventActionResponse {
    /// Builds a success body around `event`.
    #[must_use]
    pub fn new(message: impl Into<String>, event: &Event) -> Self {
        Self {
            success: true,
            message: message.into(),
            event: EventDto::from(event),
        }
    }
}

/// Success body for `PUT /admin/events/{id}/approve`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The approved event.
    pub event: EventDto,
    /// Whether the creator was promoted to organizer.
    pub creator_promoted: bool,
}

/// Success body for `DELETE /events/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Deleted event identifier.
    pub event_id: EventId,
    /// Registrations removed with the event.
    pub registrations_removed: usize,
    /// Attendance records removed with the event.
    pub attendance_removed: usize,
}

impl From<&RemovedEvent> for DeleteEventResponse {
    fn from(removed: &RemovedEvent) -> Self {
        Self {
            success: true,
            message: "Event deleted".to_string(),
            event_id: removed.event.id,
            registrations_removed: removed.registrations_removed,
            attendance_removed: removed.attendance_removed,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_request(json: &str) -> CreateEventRequest {
        let Ok(req) = serde_json::from_str(json) else {
            panic!("request did not parse: {json}");
        };
        req
    }

    #[test]
    fn create_request_reads_camel_case() {
        let req = create_request(
            r#"{"title":"Rust 101","description":"Intro","category":"workshop",
                "date":"2026-01-10T10:00:00Z","location":"Hall B","maxAttendees":30}"#,
        );
        let Ok(new) = NewEvent::try_from(req) else {
            panic!("conversion failed");
        };
        assert_eq!(new.max_attendees, 30);
        assert_eq!(new.date, Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).single().unwrap_or_default());
    }

    #[test]
    fn missing_date_is_a_validation_error() {
        let req = create_request(r#"{"title":"Rust 101"}"#);
        assert!(matches!(
            NewEvent::try_from(req),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn event_dto_serializes_camel_case_with_snake_case_status() {
        let creator = UserId::new();
        let new = NewEvent {
            title: "Rust 101".to_string(),
            description: "Intro".to_string(),
            category: "workshop".to_string(),
            date: Utc::now(),
            location: "Hall B".to_string(),
            max_attendees: 10,
        };
        let event = Event::draft(new, creator, Utc::now());
        let Ok(json) = serde_json::to_value(EventActionResponse::new("ok", &event)) else {
            panic!("serialization failed");
        };
        assert_eq!(json["success"], true);
        assert_eq!(json["event"]["status"], "draft");
        assert_eq!(json["event"]["maxAttendees"], 10);
        assert_eq!(json["event"]["registrationClosed"], false);
        assert!(json["event"]["closedAt"].is_null());
    }

    #[test]
    fn detail_response_flattens_event() {
        let new = NewEvent {
            title: "Talk".to_string(),
            description: "d".to_string(),
            category: "c".to_string(),
            date: Utc::now(),
            location: "l".to_string(),
            max_attendees: 3,
        };
        let event = Event::draft(new, UserId::new(), Utc::now());
        let body = EventDetailResponse {
            event: EventDto::from(&event),
            is_registered: true,
            seats_left: event.seats_left(),
            accepting_registrations: event.accepts_registrations(),
        };
        let Ok(json) = serde_json::to_value(body) else {
            panic!("serialization failed");
        };
        assert_eq!(json["title"], "Talk");
        assert_eq!(json["isRegistered"], true);
        assert_eq!(json["seatsLeft"], 3);
        assert_eq!(json["acceptingRegistrations"], false);
    }
}
