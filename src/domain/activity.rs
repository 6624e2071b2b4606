//! Domain activity emitted after every event mutation.
//!
//! Each successful lifecycle transition, registration change or check-in
//! publishes an [`ActivityEvent`] through the [`super::ActivityBus`].
//! Activities are logged and optionally persisted to the PostgreSQL
//! activity log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CheckInStatus, EventId, EventStatus, UserId};

/// Domain activity emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "activity_type", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A draft proposal was created.
    ProposalCreated {
        /// Event identifier.
        event_id: EventId,
        /// Proposing user.
        creator_id: UserId,
        /// Proposed title.
        title: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A draft was edited.
    ProposalUpdated {
        /// Event identifier.
        event_id: EventId,
        /// Editing user.
        actor_id: UserId,
        /// Edit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The status changed (submit, cancel, approve, reject).
    StatusChanged {
        /// Event identifier.
        event_id: EventId,
        /// User who triggered the transition.
        actor_id: UserId,
        /// Status before the transition.
        from: EventStatus,
        /// Status after the transition.
        to: EventStatus,
        /// Reviewer notes, if any.
        notes: Option<String>,
        /// Transition timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A student was promoted to organizer by their first approval.
    CreatorPromoted {
        /// Approved event that triggered the promotion.
        event_id: EventId,
        /// Promoted user.
        user_id: UserId,
        /// Promotion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Registration was closed or reopened.
    RegistrationToggled {
        /// Event identifier.
        event_id: EventId,
        /// User who toggled registration.
        actor_id: UserId,
        /// New value of the closed flag.
        closed: bool,
        /// Toggle timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user registered for the event.
    AttendeeRegistered {
        /// Event identifier.
        event_id: EventId,
        /// Registered user.
        user_id: UserId,
        /// Attendee count after registration.
        current_attendees: u32,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user withdrew their registration.
    AttendeeUnregistered {
        /// Event identifier.
        event_id: EventId,
        /// Withdrawing user.
        user_id: UserId,
        /// Attendee count after withdrawal.
        current_attendees: u32,
        /// Withdrawal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A check-in was recorded.
    AttendanceRecorded {
        /// Event identifier.
        event_id: EventId,
        /// Attendee.
        user_id: UserId,
        /// Staff member who checked the attendee in.
        checked_in_by: UserId,
        /// Derived punctuality.
        check_in_status: CheckInStatus,
        /// Check-in timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The event and everything attached to it was deleted.
    EventDeleted {
        /// Event identifier.
        event_id: EventId,
        /// Deleting user.
        actor_id: UserId,
        /// Status at deletion.
        status: EventStatus,
        /// Registrations removed with the event.
        registrations_removed: usize,
        /// Attendance records removed with the event.
        attendance_removed: usize,
        /// Deletion timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ActivityEvent {
    /// Returns the event ID associated with this activity.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::ProposalCreated { event_id, .. }
            | Self::ProposalUpdated { event_id, .. }
            | Self::StatusChanged { event_id, .. }
            | Self::CreatorPromoted { event_id, .. }
            | Self::RegistrationToggled { event_id, .. }
            | Self::AttendeeRegistered { event_id, .. }
            | Self::AttendeeUnregistered { event_id, .. }
            | Self::AttendanceRecorded { event_id, .. }
            | Self::EventDeleted { event_id, .. } => *event_id,
        }
    }

    /// Returns the activity type as a static string slice.
    #[must_use]
    pub const fn activity_type_str(&self) -> &'static str {
        match self {
            Self::ProposalCreated { .. } => "proposal_created",
            Self::ProposalUpdated { .. } => "proposal_updated",
            Self::StatusChanged { .. } => "status_changed",
            Self::CreatorPromoted { .. } => "creator_promoted",
            Self::RegistrationToggled { .. } => "registration_toggled",
            Self::AttendeeRegistered { .. } => "attendee_registered",
            Self::AttendeeUnregistered { .. } => "attendee_unregistered",
            Self::AttendanceRecorded { .. } => "attendance_recorded",
            Self::EventDeleted { .. } => "event_deleted",
        }
    }
}
