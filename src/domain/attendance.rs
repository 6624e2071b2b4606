//! Registrations, attendance records, and the check-in classifier.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, UserId};

/// Arrivals more than this long before the start are early.
pub const EARLY_THRESHOLD: TimeDelta = TimeDelta::hours(2);

/// Arrivals more than this long after the start are late.
pub const LATE_THRESHOLD: TimeDelta = TimeDelta::hours(1);

/// Punctuality of a check-in relative to the event start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// Checked in more than two hours before the start.
    Early,
    /// Checked in between two hours before and one hour after the start.
    OnTime,
    /// Checked in more than one hour after the start.
    Late,
}

impl CheckInStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::OnTime => "on_time",
            Self::Late => "late",
        }
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a check-in at `check_in_time` for an event starting at
/// `event_time`.
///
/// The lead time `event_time - check_in_time` is compared against the
/// thresholds in this order: more than [`EARLY_THRESHOLD`] is
/// [`CheckInStatus::Early`], less than minus [`LATE_THRESHOLD`] is
/// [`CheckInStatus::Late`], anything else (boundaries included) is
/// [`CheckInStatus::OnTime`].
#[must_use]
pub fn classify_check_in(event_time: DateTime<Utc>, check_in_time: DateTime<Utc>) -> CheckInStatus {
    let lead = event_time - check_in_time;
    if lead > EARLY_THRESHOLD {
        CheckInStatus::Early
    } else if lead < -LATE_THRESHOLD {
        CheckInStatus::Late
    } else {
        CheckInStatus::OnTime
    }
}

/// A user's signup for an approved event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Registered user.
    pub user_id: UserId,
    /// Event registered for.
    pub event_id: EventId,
    /// Signup time.
    pub registered_at: DateTime<Utc>,
}

/// A physical-presence record, unique per user and event.
///
/// The status is derived once when the record is created and never
/// recomputed, even if the event is rescheduled later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Attendee.
    pub user_id: UserId,
    /// Event attended.
    pub event_id: EventId,
    /// When the attendee checked in.
    pub check_in_time: DateTime<Utc>,
    /// Staff member or admin who performed the check-in.
    pub checked_in_by: UserId,
    /// Punctuality relative to the event start at check-in time.
    pub check_in_status: CheckInStatus,
}

impl AttendanceRecord {
    /// Builds a record, classifying `check_in_time` against `event_time`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        event_id: EventId,
        event_time: DateTime<Utc>,
        check_in_time: DateTime<Utc>,
        checked_in_by: UserId,
    ) -> Self {
        Self {
            user_id,
            event_id,
            check_in_time,
            checked_in_by,
            check_in_status: classify_check_in(event_time, check_in_time),
        }
    }
}
