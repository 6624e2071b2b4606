//! Event service: orchestrates lifecycle transitions, registration and
//! check-in, and emits activity.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    ActivityBus, ActivityEvent, Actor, AttendanceRecord, Event, EventFilter, EventId, EventPatch,
    EventStatus, EventStore, NewEvent, RemovedEvent, UserDirectory, UserId,
};
use crate::error::ServiceError;

/// Outcome of an approval.
#[derive(Debug, Clone)]
pub struct Approval {
    /// The approved event.
    pub event: Event,
    /// Whether the creator was promoted from student to organizer.
    pub creator_promoted: bool,
}

/// Orchestration layer for all event operations.
///
/// Stateless coordinator: owns references to [`EventStore`] for documents,
/// [`UserDirectory`] for roles, and [`ActivityBus`] for activity. Every
/// mutation follows the pattern: conditional update in the store → side
/// effects → publish activity → return the new document.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<EventStore>,
    users: Arc<UserDirectory>,
    activity_bus: ActivityBus,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<EventStore>, users: Arc<UserDirectory>, activity_bus: ActivityBus) -> Self {
        Self {
            store,
            users,
            activity_bus,
        }
    }

    /// Returns a reference to the inner [`EventStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Returns a reference to the inner [`ActivityBus`].
    #[must_use]
    pub fn activity_bus(&self) -> &ActivityBus {
        &self.activity_bus
    }

    /// Stores a new draft owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid input.
    pub async fn create_proposal(&self, actor: &Actor, new: NewEvent) -> Result<Event, ServiceError> {
        let now = Utc::now();
        let event = Event::draft(new.validated()?, actor.user_id, now);
        let event_id = self.store.create_event(event.clone()).await?;

        let _ = self.activity_bus.publish(ActivityEvent::ProposalCreated {
            event_id,
            creator_id: actor.user_id,
            title: event.title.clone(),
            timestamp: now,
        });

        tracing::info!(%event_id, creator_id = %actor.user_id, "proposal created");
        Ok(event)
    }

    /// Edits a draft.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`], [`ServiceError::Forbidden`],
    /// [`ServiceError::InvalidTransition`] or [`ServiceError::Validation`].
    pub async fn update_proposal(
        &self,
        actor: &Actor,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<Event, ServiceError> {
        let now = Utc::now();
        let (event, ()) = self
            .store
            .update_event(event_id, |ev| ev.apply_patch(actor, patch, now))
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::ProposalUpdated {
            event_id,
            actor_id: actor.user_id,
            timestamp: now,
        });

        tracing::info!(%event_id, "proposal updated");
        Ok(event)
    }

    /// `draft → pending`.
    ///
    /// # Errors
    ///
    /// See [`Event::submit`].
    pub async fn submit_proposal(&self, actor: &Actor, event_id: EventId) -> Result<Event, ServiceError> {
        self.transition(actor, event_id, None, |ev, now| ev.submit(actor, now))
            .await
    }

    /// `pending → draft`.
    ///
    /// # Errors
    ///
    /// See [`Event::cancel_submission`].
    pub async fn cancel_submission(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Event, ServiceError> {
        self.transition(actor, event_id, None, |ev, now| {
            ev.cancel_submission(actor, now)
        })
        .await
    }

    /// `pending → approved`, promoting a student creator to organizer.
    ///
    /// # Errors
    ///
    /// See [`Event::approve`].
    pub async fn approve_event(
        &self,
        actor: &Actor,
        event_id: EventId,
        notes: Option<String>,
    ) -> Result<Approval, ServiceError> {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let event = self
            .transition(actor, event_id, notes.clone(), |ev, now| {
                ev.approve(actor, notes, now)
            })
            .await?;

        let creator_promoted = match self.users.promote_to_organizer(event.creator_id).await {
            Ok(promoted) => promoted,
            Err(err) => {
                tracing::warn!(%event_id, creator_id = %event.creator_id, error = %err, "creator promotion skipped");
                false
            }
        };

        if creator_promoted {
            let _ = self.activity_bus.publish(ActivityEvent::CreatorPromoted {
                event_id,
                user_id: event.creator_id,
                timestamp: Utc::now(),
            });
            tracing::info!(user_id = %event.creator_id, "creator promoted to organizer");
        }

        Ok(Approval {
            event,
            creator_promoted,
        })
    }

    /// `pending → rejected` with notes.
    ///
    /// # Errors
    ///
    /// See [`Event::reject`].
    pub async fn reject_event(
        &self,
        actor: &Actor,
        event_id: EventId,
        notes: &str,
    ) -> Result<Event, ServiceError> {
        self.transition(actor, event_id, Some(notes.trim().to_string()), |ev, now| {
            ev.reject(actor, notes, now)
        })
        .await
    }

    /// Closes registration on an approved event.
    ///
    /// # Errors
    ///
    /// See [`Event::close_registration`].
    pub async fn close_registration(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Event, ServiceError> {
        self.toggle_registration(actor, event_id, true).await
    }

    /// Reopens registration on an approved event.
    ///
    /// # Errors
    ///
    /// See [`Event::open_registration`].
    pub async fn open_registration(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Event, ServiceError> {
        self.toggle_registration(actor, event_id, false).await
    }

    /// Registers the caller for an approved event.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`], [`ServiceError::AlreadyRegistered`],
    /// [`ServiceError::NotApproved`], [`ServiceError::RegistrationClosed`] or
    /// [`ServiceError::EventFull`].
    pub async fn register_attendee(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Event, ServiceError> {
        let now = Utc::now();
        let event = self
            .store
            .increment_attendee_count(event_id, actor.user_id, now)
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::AttendeeRegistered {
            event_id,
            user_id: actor.user_id,
            current_attendees: event.current_attendees,
            timestamp: now,
        });

        tracing::info!(
            %event_id,
            user_id = %actor.user_id,
            current = event.current_attendees,
            max = event.max_attendees,
            "attendee registered"
        );
        Ok(event)
    }

    /// Withdraws the caller's registration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::NotRegistered`].
    pub async fn unregister_attendee(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Event, ServiceError> {
        let now = Utc::now();
        let event = self
            .store
            .decrement_attendee_count(event_id, actor.user_id, now)
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::AttendeeUnregistered {
            event_id,
            user_id: actor.user_id,
            current_attendees: event.current_attendees,
            timestamp: now,
        });

        tracing::info!(%event_id, user_id = %actor.user_id, "attendee unregistered");
        Ok(event)
    }

    /// Records that `user_id` is physically present, classifying the
    /// check-in against the event start. `check_in_time` defaults to now.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`], [`ServiceError::UserNotFound`],
    /// [`ServiceError::Forbidden`] unless the caller is the creator or an
    /// admin, [`ServiceError::NotApproved`], or
    /// [`ServiceError::DuplicateAttendance`].
    pub async fn check_in(
        &self,
        actor: &Actor,
        event_id: EventId,
        user_id: UserId,
        check_in_time: Option<DateTime<Utc>>,
    ) -> Result<AttendanceRecord, ServiceError> {
        let event = self.store.get_event(event_id).await?;
        event.ensure_owner_or_admin(actor)?;
        self.users.get(user_id).await?;

        let check_in_time = check_in_time.unwrap_or_else(Utc::now);
        let record = self
            .store
            .create_attendance_record(event_id, user_id, |ev| {
                if ev.status != EventStatus::Approved {
                    return Err(ServiceError::NotApproved(ev.status));
                }
                Ok(AttendanceRecord::new(
                    user_id,
                    event_id,
                    ev.date,
                    check_in_time,
                    actor.user_id,
                ))
            })
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::AttendanceRecorded {
            event_id,
            user_id,
            checked_in_by: actor.user_id,
            check_in_status: record.check_in_status,
            timestamp: record.check_in_time,
        });

        tracing::info!(
            %event_id,
            %user_id,
            status = %record.check_in_status,
            "attendance recorded"
        );
        Ok(record)
    }

    /// Lists an event's attendance records. Staff only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
    pub async fn list_attendance(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let event = self.store.get_event(event_id).await?;
        event.ensure_owner_or_admin(actor)?;
        self.store.list_attendance(event_id).await
    }

    /// Returns one user's attendance record, visible to staff and to the
    /// attendee themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
    pub async fn find_attendance(
        &self,
        actor: &Actor,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let event = self.store.get_event(event_id).await?;
        if actor.user_id != user_id {
            event.ensure_owner_or_admin(actor)?;
        }
        self.store.find_attendance(user_id, event_id).await
    }

    /// Deletes an event with its registrations and attendance. Admins and
    /// the creator may delete in any status.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
    pub async fn delete_event(
        &self,
        actor: &Actor,
        event_id: EventId,
    ) -> Result<RemovedEvent, ServiceError> {
        let removed = self
            .store
            .remove(event_id, |ev| ev.ensure_owner_or_admin(actor))
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::EventDeleted {
            event_id,
            actor_id: actor.user_id,
            status: removed.event.status,
            registrations_removed: removed.registrations_removed,
            attendance_removed: removed.attendance_removed,
            timestamp: Utc::now(),
        });

        tracing::info!(
            %event_id,
            actor_id = %actor.user_id,
            status = %removed.event.status,
            registrations = removed.registrations_removed,
            "event deleted"
        );
        Ok(removed)
    }

    /// Returns an event the caller may see, and whether the caller is
    /// registered for it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::Forbidden`].
    pub async fn get_event(&self, actor: &Actor, event_id: EventId) -> Result<(Event, bool), ServiceError> {
        let event = self.store.get_event(event_id).await?;
        event.ensure_visible_to(actor)?;
        let registered = self.store.is_registered(event_id, actor.user_id).await?;
        Ok((event, registered))
    }

    /// Returns the approved catalogue, optionally restricted to a category.
    pub async fn list_approved(&self, category: Option<String>) -> Vec<Event> {
        self.store
            .list(&EventFilter {
                status: Some(EventStatus::Approved),
                category,
                ..EventFilter::default()
            })
            .await
    }

    /// Returns every event the caller created, in any status.
    pub async fn list_own(&self, actor: &Actor, status: Option<EventStatus>) -> Vec<Event> {
        self.store
            .list(&EventFilter {
                status,
                creator_id: Some(actor.user_id),
                category: None,
            })
            .await
    }

    /// Returns the admin review queue.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for non-admins.
    pub async fn list_pending(&self, actor: &Actor) -> Result<Vec<Event>, ServiceError> {
        actor.require_admin()?;
        Ok(self
            .store
            .list(&EventFilter {
                status: Some(EventStatus::Pending),
                ..EventFilter::default()
            })
            .await)
    }

    async fn transition<F>(
        &self,
        actor: &Actor,
        event_id: EventId,
        notes: Option<String>,
        apply: F,
    ) -> Result<Event, ServiceError>
    where
        F: FnOnce(&mut Event, DateTime<Utc>) -> Result<(), ServiceError>,
    {
        let now = Utc::now();
        let (event, from) = self
            .store
            .update_event(event_id, |ev| {
                let from = ev.status;
                apply(ev, now)?;
                Ok(from)
            })
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::StatusChanged {
            event_id,
            actor_id: actor.user_id,
            from,
            to: event.status,
            notes,
            timestamp: now,
        });

        tracing::info!(
            %event_id,
            actor_id = %actor.user_id,
            %from,
            to = %event.status,
            "event status changed"
        );
        Ok(event)
    }

    async fn toggle_registration(
        &self,
        actor: &Actor,
        event_id: EventId,
        close: bool,
    ) -> Result<Event, ServiceError> {
        let now = Utc::now();
        let (event, ()) = self
            .store
            .update_event(event_id, |ev| {
                if close {
                    ev.close_registration(actor, now)
                } else {
                    ev.open_registration(actor, now)
                }
            })
            .await?;

        let _ = self.activity_bus.publish(ActivityEvent::RegistrationToggled {
            event_id,
            actor_id: actor.user_id,
            closed: event.registration_closed,
            timestamp: now,
        });

        tracing::info!(%event_id, closed = event.registration_closed, "registration toggled");
        Ok(event)
    }
}
