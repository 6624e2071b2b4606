//! Attendance DTOs for staff check-in and attendance listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AttendanceRecord, CheckInStatus, EventId, UserId};

/// Request body for `POST /events/{id}/attendance`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Attendee being checked in.
    pub user_id: UserId,
    /// Check-in time; defaults to the server clock.
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
}

/// An attendance record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDto {
    /// Attendee.
    pub user_id: UserId,
    /// Event attended.
    pub event_id: EventId,
    /// Check-in time.
    pub check_in_time: DateTime<Utc>,
    /// Staff member who performed the check-in.
    pub checked_in_by: UserId,
    /// Punctuality relative to the event start.
    pub check_in_status: CheckInStatus,
}

impl From<&AttendanceRecord> for AttendanceDto {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            user_id: record.user_id,
            event_id: record.event_id,
            check_in_time: record.check_in_time,
            checked_in_by: record.checked_in_by,
            check_in_status: record.check_in_status,
        }
    }
}

/// Success body for `POST /events/{id}/attendance`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// The new record.
    pub attendance: AttendanceDto,
}

impl From<&AttendanceRecord> for CheckInResponse {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            success: true,
            message: format!("Checked in ({})", record.check_in_status),
            attendance: AttendanceDto::from(record),
        }
    }
}

/// Response body for `GET /events/{id}/attendance`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceListResponse {
    /// Event the records belong to.
    pub event_id: EventId,
    /// Number of records.
    pub total: usize,
    /// Records ordered by check-in time.
    pub data: Vec<AttendanceDto>,
}

/// Response body for `GET /events/{id}/attendance/{user_id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLookupResponse {
    /// Whether the user has checked in.
    pub checked_in: bool,
    /// The record, if any.
    pub attendance: Option<AttendanceDto>,
}
