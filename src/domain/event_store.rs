//! Concurrent event document store with per-event locking.
//!
//! [`EventStore`] keeps every event in a `HashMap` where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. An entry holds the
//! event document together with its registrations and attendance records,
//! so deleting an event drops everything attached to it.
//!
//! Every mutation runs its guard check and its write under one acquisition
//! of the entry's write lock. In particular the capacity check and the
//! attendee increment are a single step, so concurrent registrations cannot
//! oversubscribe an event.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AttendanceRecord, Event, EventId, EventStatus, Registration, UserId};
use crate::error::ServiceError;

/// An event document plus the records that live and die with it.
#[derive(Debug)]
pub struct EventEntry {
    /// The event document.
    pub event: Event,
    /// Registrations keyed by user.
    pub registrations: HashMap<UserId, Registration>,
    /// Attendance records keyed by user.
    pub attendance: HashMap<UserId, AttendanceRecord>,
}

impl EventEntry {
    /// Wraps a fresh event with no registrations or attendance.
    #[must_use]
    pub fn new(event: Event) -> Self {
        Self {
            event,
            registrations: HashMap::new(),
            attendance: HashMap::new(),
        }
    }
}

/// Query filter for [`EventStore::list`]. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to one status.
    pub status: Option<EventStatus>,
    /// Restrict to one creator.
    pub creator_id: Option<UserId>,
    /// Restrict to one category (case-insensitive).
    pub category: Option<String>,
}

impl EventFilter {
    /// Returns `true` if `event` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(status) = self.status
            && event.status != status
        {
            return false;
        }
        if let Some(creator_id) = self.creator_id
            && event.creator_id != creator_id
        {
            return false;
        }
        if let Some(category) = &self.category
            && !event.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        true
    }
}

/// Result of deleting an event.
#[derive(Debug, Clone)]
pub struct RemovedEvent {
    /// The event as it was at deletion.
    pub event: Event,
    /// Number of registrations removed with it.
    pub registrations_removed: usize,
    /// Number of attendance records removed with it.
    pub attendance_removed: usize,
}

/// Central store for all event documents.
///
/// # Concurrency
///
/// - Reads of the same event run concurrently.
/// - Writes to different events run concurrently.
/// - Writes to the same event are serialized.
#[derive(Debug)]
pub struct EventStore {
    events: RwLock<HashMap<EventId, Arc<RwLock<EventEntry>>>>,
}

impl EventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new event document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if an event with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn create_event(&self, event: Event) -> Result<EventId, ServiceError> {
        let event_id = event.id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(ServiceError::Internal(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(EventEntry::new(event))));
        Ok(event_id)
    }

    async fn entry(&self, event_id: EventId) -> Result<Arc<RwLock<EventEntry>>, ServiceError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .map(Arc::clone)
            .ok_or(ServiceError::EventNotFound(*event_id.as_uuid()))
    }

    /// Returns a snapshot of the event document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if no such event exists.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.event.clone())
    }

    /// Conditionally updates an event.
    ///
    /// `apply` runs on a copy of the document while the entry's write lock
    /// is held; the copy replaces the stored document only if `apply`
    /// succeeds. Returns the updated document and `apply`'s output.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or whatever `apply` returns.
    pub async fn update_event<T, F>(
        &self,
        event_id: EventId,
        apply: F,
    ) -> Result<(Event, T), ServiceError>
    where
        F: FnOnce(&mut Event) -> Result<T, ServiceError>,
    {
        let entry_lock = self.entry(event_id).await?;
        let mut entry = entry_lock.write().await;
        let mut updated = entry.event.clone();
        let output = apply(&mut updated)?;
        entry.event = updated.clone();
        Ok((updated, output))
    }

    /// Registers `user_id` and increments the attendee count in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`], [`ServiceError::AlreadyRegistered`],
    /// or any guard failure from [`Event::reserve_seat`].
    pub async fn increment_attendee_count(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Event, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let mut entry = entry_lock.write().await;
        if entry.registrations.contains_key(&user_id) {
            return Err(ServiceError::AlreadyRegistered);
        }
        entry.event.reserve_seat(now)?;
        entry.registrations.insert(
            user_id,
            Registration {
                user_id,
                event_id,
                registered_at: now,
            },
        );
        Ok(entry.event.clone())
    }

    /// Removes `user_id`'s registration and decrements the attendee count.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or [`ServiceError::NotRegistered`].
    pub async fn decrement_attendee_count(
        &self,
        event_id: EventId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Event, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let mut entry = entry_lock.write().await;
        if entry.registrations.remove(&user_id).is_none() {
            return Err(ServiceError::NotRegistered);
        }
        entry.event.release_seat(now);
        Ok(entry.event.clone())
    }

    /// Returns `true` if `user_id` is registered for the event.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if no such event exists.
    pub async fn is_registered(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<bool, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.registrations.contains_key(&user_id))
    }

    /// Creates the attendance record for `user_id`, unless one exists.
    ///
    /// `build` receives the current event and produces the record; it runs
    /// under the entry's write lock after the duplicate check.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`], [`ServiceError::DuplicateAttendance`]
    /// (leaving the existing record untouched) or whatever `build` returns.
    pub async fn create_attendance_record<F>(
        &self,
        event_id: EventId,
        user_id: UserId,
        build: F,
    ) -> Result<AttendanceRecord, ServiceError>
    where
        F: FnOnce(&Event) -> Result<AttendanceRecord, ServiceError>,
    {
        let entry_lock = self.entry(event_id).await?;
        let mut entry = entry_lock.write().await;
        if entry.attendance.contains_key(&user_id) {
            return Err(ServiceError::DuplicateAttendance(*user_id.as_uuid()));
        }
        let record = build(&entry.event)?;
        entry.attendance.insert(user_id, record.clone());
        Ok(record)
    }

    /// Looks up the attendance record for a user and event.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if no such event exists.
    pub async fn find_attendance(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<Option<AttendanceRecord>, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.attendance.get(&user_id).cloned())
    }

    /// Returns all attendance records of an event ordered by check-in time.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] if no such event exists.
    pub async fn list_attendance(
        &self,
        event_id: EventId,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let entry_lock = self.entry(event_id).await?;
        let entry = entry_lock.read().await;
        let mut records: Vec<AttendanceRecord> = entry.attendance.values().cloned().collect();
        records.sort_by_key(|r| r.check_in_time);
        Ok(records)
    }

    /// Removes an event with its registrations and attendance, provided
    /// `allow` accepts the current document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EventNotFound`] or whatever `allow` returns.
    pub async fn remove<F>(&self, event_id: EventId, allow: F) -> Result<RemovedEvent, ServiceError>
    where
        F: FnOnce(&Event) -> Result<(), ServiceError>,
    {
        let mut map = self.events.write().await;
        let entry_lock = map
            .get(&event_id)
            .map(Arc::clone)
            .ok_or(ServiceError::EventNotFound(*event_id.as_uuid()))?;
        let entry = entry_lock.read().await;
        allow(&entry.event)?;
        map.remove(&event_id);
        Ok(RemovedEvent {
            event: entry.event.clone(),
            registrations_removed: entry.registrations.len(),
            attendance_removed: entry.attendance.len(),
        })
    }

    /// Returns snapshots of all events matching `filter`, ordered by
    /// scheduled date.
    pub async fn list(&self, filter: &EventFilter) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if filter.matches(&entry.event) {
                events.push(entry.event.clone());
            }
        }
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        events
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
