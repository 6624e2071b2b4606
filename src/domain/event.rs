//! Event document and its lifecycle state machine.
//!
//! An [`Event`] moves through `draft → pending → approved | rejected`.
//! Approved events additionally carry a `registration_closed` flag. Every
//! transition is a method on [`Event`] that checks its guards first and
//! only then mutates, so a failed call leaves the document untouched.
//!
//! ```text
//!            submit              approve
//!   draft ───────────▶ pending ───────────▶ approved ⇄ (registration open/closed)
//!     ▲                   │
//!     └───────────────────┤ cancel
//!                         │ reject (notes)
//!                         ▼
//!                      rejected
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Actor, EventId, UserId};
use crate::error::ServiceError;

/// Approval status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Editable proposal, visible only to its creator and admins.
    Draft,
    /// Submitted and awaiting an admin decision.
    Pending,
    /// Published; attendees may register.
    Approved,
    /// Declined by an admin, with notes.
    Rejected,
}

impl EventStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for a new event proposal.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category label (e.g. `"workshop"`).
    pub category: String,
    /// Scheduled start time.
    pub date: DateTime<Utc>,
    /// Venue.
    pub location: String,
    /// Attendee capacity, at least 1.
    pub max_attendees: u32,
}

impl NewEvent {
    /// Trims text fields and checks that none are empty and that the
    /// capacity is at least one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] naming the first invalid field.
    pub fn validated(self) -> Result<Self, ServiceError> {
        Ok(Self {
            title: required("title", &self.title)?,
            description: required("description", &self.description)?,
            category: required("category", &self.category)?,
            date: self.date,
            location: required("location", &self.location)?,
            max_attendees: capacity(self.max_attendees)?,
        })
    }
}

/// Partial update of a draft's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
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

/// An event document.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Document identifier.
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
    /// Number of registered attendees; never exceeds `max_attendees`.
    pub current_attendees: u32,
    /// Approval status.
    pub status: EventStatus,
    /// Whether registration is closed. Only meaningful when approved.
    pub registration_closed: bool,
    /// When registration was last closed; `None` while open.
    pub closed_at: Option<DateTime<Utc>>,
    /// Reviewer notes; required on rejection, optional on approval.
    pub approval_notes: Option<String>,
    /// Account that proposed the event.
    pub creator_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// When the event was last submitted for approval.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Admin who approved or rejected the event.
    pub reviewed_by: Option<UserId>,
    /// When the event was approved or rejected.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates a new draft owned by `creator_id`.
    #[must_use]
    pub fn draft(new: NewEvent, creator_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            title: new.title,
            description: new.description,
            category: new.category,
            date: new.date,
            location: new.location,
            max_attendees: new.max_attendees,
            current_attendees: 0,
            status: EventStatus::Draft,
            registration_closed: false,
            closed_at: None,
            approval_notes: None,
            creator_id,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    /// Returns `true` if `actor` created this event.
    #[must_use]
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.creator_id == actor.user_id
    }

    /// Returns `true` if attendees may currently register.
    #[must_use]
    pub fn accepts_registrations(&self) -> bool {
        self.status == EventStatus::Approved
            && !self.registration_closed
            && self.current_attendees < self.max_attendees
    }

    /// Number of seats still available.
    #[must_use]
    pub const fn seats_left(&self) -> u32 {
        self.max_attendees.saturating_sub(self.current_attendees)
    }

    /// Fails unless `actor` is the creator.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for anyone but the creator.
    pub fn ensure_owner(&self, actor: &Actor) -> Result<(), ServiceError> {
        if self.is_owned_by(actor) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "only the event creator may do this".to_string(),
            ))
        }
    }

    /// Fails unless `actor` is the creator or an admin.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for other callers.
    pub fn ensure_owner_or_admin(&self, actor: &Actor) -> Result<(), ServiceError> {
        if actor.is_admin() || self.is_owned_by(actor) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "only the event creator or an admin may do this".to_string(),
            ))
        }
    }

    /// Approved events are public; anything else is limited to the creator
    /// and admins.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] if `actor` may not see the event.
    pub fn ensure_visible_to(&self, actor: &Actor) -> Result<(), ServiceError> {
        if self.status == EventStatus::Approved {
            return Ok(());
        }
        self.ensure_owner_or_admin(actor)
    }

    /// Applies a partial update. Only the creator may edit, and only while
    /// the event is a draft.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`], [`ServiceError::InvalidTransition`]
    /// or [`ServiceError::Validation`].
    pub fn apply_patch(
        &mut self,
        actor: &Actor,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.ensure_owner(actor)?;
        if self.status != EventStatus::Draft {
            return Err(ServiceError::InvalidTransition {
                from: self.status,
                action: "edit",
            });
        }

        let title = patch.title.as_deref().map(|v| required("title", v)).transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(|v| required("description", v))
            .transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|v| required("category", v))
            .transpose()?;
        let location = patch
            .location
            .as_deref()
            .map(|v| required("location", v))
            .transpose()?;
        let max_attendees = patch.max_attendees.map(capacity).transpose()?;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = patch.date {
            self.date = v;
        }
        if let Some(v) = max_attendees {
            self.max_attendees = v;
        }
        self.updated_at = now;
        Ok(())
    }

    /// `draft → pending`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] unless called by the creator, and
    /// [`ServiceError::InvalidTransition`] unless the event is a draft.
    pub fn submit(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), ServiceError> {
        self.ensure_owner(actor)?;
        if self.status != EventStatus::Draft {
            return Err(ServiceError::InvalidTransition {
                from: self.status,
                action: "submit",
            });
        }
        self.status = EventStatus::Pending;
        self.submitted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `pending → draft`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] unless called by the creator, and
    /// [`ServiceError::NotPending`] unless the event is pending.
    pub fn cancel_submission(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.ensure_owner(actor)?;
        if self.status != EventStatus::Pending {
            return Err(ServiceError::NotPending(self.status));
        }
        self.status = EventStatus::Draft;
        self.submitted_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// `pending → approved`. Registration starts open.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for non-admins and
    /// [`ServiceError::NotPending`] unless the event is pending.
    pub fn approve(
        &mut self,
        actor: &Actor,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        actor.require_admin()?;
        if self.status != EventStatus::Pending {
            return Err(ServiceError::NotPending(self.status));
        }
        self.status = EventStatus::Approved;
        self.approval_notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self.registration_closed = false;
        self.closed_at = None;
        self.reviewed_by = Some(actor.user_id);
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `pending → rejected`, persisting the reviewer's notes.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for non-admins,
    /// [`ServiceError::Validation`] for blank notes and
    /// [`ServiceError::NotPending`] unless the event is pending.
    pub fn reject(
        &mut self,
        actor: &Actor,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        actor.require_admin()?;
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(ServiceError::Validation(
                "rejection notes are required".to_string(),
            ));
        }
        if self.status != EventStatus::Pending {
            return Err(ServiceError::NotPending(self.status));
        }
        self.status = EventStatus::Rejected;
        self.approval_notes = Some(notes.to_string());
        self.reviewed_by = Some(actor.user_id);
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Closes registration on an approved event and stamps `closed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] unless called by the creator or
    /// an admin, and [`ServiceError::NotApproved`] unless approved.
    pub fn close_registration(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.ensure_owner_or_admin(actor)?;
        if self.status != EventStatus::Approved {
            return Err(ServiceError::NotApproved(self.status));
        }
        self.registration_closed = true;
        self.closed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Reopens registration on an approved event and clears `closed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] unless called by the creator or
    /// an admin, and [`ServiceError::NotApproved`] unless approved.
    pub fn open_registration(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.ensure_owner_or_admin(actor)?;
        if self.status != EventStatus::Approved {
            return Err(ServiceError::NotApproved(self.status));
        }
        self.registration_closed = false;
        self.closed_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Takes one seat if the event accepts registrations.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotApproved`], [`ServiceError::RegistrationClosed`]
    /// or [`ServiceError::EventFull`], checked in that order.
    pub fn reserve_seat(&mut self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        if self.status != EventStatus::Approved {
            return Err(ServiceError::NotApproved(self.status));
        }
        if self.registration_closed {
            return Err(ServiceError::RegistrationClosed);
        }
        if self.current_attendees >= self.max_attendees {
            return Err(ServiceError::EventFull(self.max_attendees));
        }
        self.current_attendees += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Gives one seat back.
    pub fn release_seat(&mut self, now: DateTime<Utc>) {
        self.current_attendees = self.current_attendees.saturating_sub(1);
        self.updated_at = now;
    }
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn capacity(max_attendees: u32) -> Result<u32, ServiceError> {
    if max_attendees == 0 {
        return Err(ServiceError::Validation(
            "maxAttendees must be at least 1".to_string(),
        ));
    }
    Ok(max_attendees)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        let Some(t) = Utc.with_ymd_and_hms(2026, 1, 10, hour, 0, 0).single() else {
            panic!("valid timestamp");
        };
        t
    }

    fn new_event(max_attendees: u32) -> NewEvent {
        NewEvent {
            title: "  Robotics Night ".to_string(),
            description: "Build and race line followers".to_string(),
            category: "workshop".to_string(),
            date: at(18),
            location: "Engineering Hall 2".to_string(),
            max_attendees,
        }
    }

    fn parties() -> (Actor, Actor, Actor) {
        (
            Actor::new(UserId::new(), Role::Student),
            Actor::new(UserId::new(), Role::Admin),
            Actor::new(UserId::new(), Role::Student),
        )
    }

    fn pending_event(creator: &Actor) -> Event {
        let mut event = Event::draft(new_event(2), creator.user_id, at(8));
        let Ok(()) = event.submit(creator, at(9)) else {
            panic!("submit failed");
        };
        event
    }

    fn approved_event(creator: &Actor, admin: &Actor) -> Event {
        let mut event = pending_event(creator);
        let Ok(()) = event.approve(admin, None, at(10)) else {
            panic!("approve failed");
        };
        event
    }

    #[test]
    fn validation_trims_and_rejects_blank_fields() {
        let Ok(valid) = new_event(5).validated() else {
            panic!("expected valid input");
        };
        assert_eq!(valid.title, "Robotics Night");

        let mut blank = new_event(5);
        blank.location = "   ".to_string();
        assert!(matches!(blank.validated(), Err(ServiceError::Validation(_))));

        assert!(matches!(
            new_event(0).validated(),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn draft_starts_empty_and_open() {
        let creator = Actor::new(UserId::new(), Role::Student);
        let event = Event::draft(new_event(3), creator.user_id, at(8));
        assert_eq!(event.status, EventStatus::Draft);
        assert_eq!(event.current_attendees, 0);
        assert!(!event.registration_closed);
        assert!(event.closed_at.is_none());
    }

    #[test]
    fn only_creator_may_submit_a_draft() {
        let (creator, admin, stranger) = parties();
        let mut event = Event::draft(new_event(3), creator.user_id, at(8));

        assert!(matches!(
            event.submit(&stranger, at(9)),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            event.submit(&admin, at(9)),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(event.submit(&creator, at(9)).is_ok());
        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.submitted_at, Some(at(9)));

        assert!(matches!(
            event.submit(&creator, at(9)),
            Err(ServiceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_submission_returns_to_draft() {
        let (creator, _, _) = parties();
        let mut event = pending_event(&creator);
        assert!(event.cancel_submission(&creator, at(10)).is_ok());
        assert_eq!(event.status, EventStatus::Draft);
        assert!(event.submitted_at.is_none());

        assert!(matches!(
            event.cancel_submission(&creator, at(10)),
            Err(ServiceError::NotPending(EventStatus::Draft))
        ));
    }

    #[test]
    fn approve_twice_yields_not_pending_without_change() {
        let (creator, admin, _) = parties();
        let mut event = approved_event(&creator, &admin);
        let before = event.clone();

        assert!(matches!(
            event.approve(&admin, None, at(12)),
            Err(ServiceError::NotPending(EventStatus::Approved))
        ));
        assert!(matches!(
            event.reject(&admin, "late", at(12)),
            Err(ServiceError::NotPending(EventStatus::Approved))
        ));
        assert_eq!(event, before);
    }

    #[test]
    fn approval_requires_admin() {
        let (creator, _, _) = parties();
        let mut event = pending_event(&creator);
        assert!(matches!(
            event.approve(&creator, None, at(10)),
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(event.status, EventStatus::Pending);
    }

    #[test]
    fn reject_without_notes_is_validation_error() {
        let (creator, admin, _) = parties();
        let mut event = pending_event(&creator);

        assert!(matches!(
            event.reject(&admin, "   ", at(10)),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(event.status, EventStatus::Pending);

        assert!(event.reject(&admin, " Room unavailable ", at(10)).is_ok());
        assert_eq!(event.status, EventStatus::Rejected);
        assert_eq!(event.approval_notes.as_deref(), Some("Room unavailable"));
        assert_eq!(event.reviewed_by, Some(admin.user_id));
    }

    #[test]
    fn close_registration_on_draft_is_not_approved() {
        let (creator, _, _) = parties();
        let mut event = Event::draft(new_event(3), creator.user_id, at(8));
        assert!(matches!(
            event.close_registration(&creator, at(9)),
            Err(ServiceError::NotApproved(EventStatus::Draft))
        ));
        assert!(!event.registration_closed);
    }

    #[test]
    fn close_then_open_toggles_flag_and_timestamp() {
        let (creator, admin, stranger) = parties();
        let mut event = approved_event(&creator, &admin);

        assert!(matches!(
            event.close_registration(&stranger, at(11)),
            Err(ServiceError::Forbidden(_))
        ));

        assert!(event.close_registration(&creator, at(11)).is_ok());
        assert!(event.registration_closed);
        assert_eq!(event.closed_at, Some(at(11)));

        assert!(event.open_registration(&admin, at(12)).is_ok());
        assert!(!event.registration_closed);
        assert!(event.closed_at.is_none());
    }

    #[test]
    fn reserve_seat_enforces_guards_in_order() {
        let (creator, admin, _) = parties();

        let mut draft = Event::draft(new_event(1), creator.user_id, at(8));
        assert!(!draft.accepts_registrations());
        assert!(matches!(
            draft.reserve_seat(at(9)),
            Err(ServiceError::NotApproved(_))
        ));

        let mut event = approved_event(&creator, &admin);
        assert!(event.accepts_registrations());
        assert!(event.reserve_seat(at(11)).is_ok());
        assert!(event.reserve_seat(at(11)).is_ok());
        assert!(!event.accepts_registrations());
        assert!(matches!(
            event.reserve_seat(at(11)),
            Err(ServiceError::EventFull(2))
        ));
        assert_eq!(event.current_attendees, 2);

        let Ok(()) = event.close_registration(&creator, at(12)) else {
            panic!("close failed");
        };
        event.release_seat(at(12));
        assert!(!event.accepts_registrations());
        assert!(matches!(
            event.reserve_seat(at(12)),
            Err(ServiceError::RegistrationClosed)
        ));
    }

    #[test]
    fn patch_only_applies_to_drafts() {
        let (creator, admin, _) = parties();
        let mut draft = Event::draft(new_event(3), creator.user_id, at(8));
        let patch = EventPatch {
            title: Some("Robotics Night II".to_string()),
            max_attendees: Some(40),
            ..EventPatch::default()
        };
        assert!(draft.apply_patch(&creator, patch.clone(), at(9)).is_ok());
        assert_eq!(draft.title, "Robotics Night II");
        assert_eq!(draft.max_attendees, 40);

        let bad = EventPatch {
            max_attendees: Some(0),
            ..EventPatch::default()
        };
        assert!(matches!(
            draft.apply_patch(&creator, bad, at(9)),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(draft.max_attendees, 40);

        let mut approved = approved_event(&creator, &admin);
        assert!(matches!(
            approved.apply_patch(&creator, patch, at(12)),
            Err(ServiceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn non_approved_events_are_private() {
        let (creator, admin, stranger) = parties();
        let event = pending_event(&creator);
        assert!(event.ensure_visible_to(&creator).is_ok());
        assert!(event.ensure_visible_to(&admin).is_ok());
        assert!(event.ensure_visible_to(&stranger).is_err());

        let approved = approved_event(&creator, &admin);
        assert!(approved.ensure_visible_to(&stranger).is_ok());
    }
}
