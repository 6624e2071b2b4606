//! Domain layer: event documents, lifecycle rules, users, and activity.
//!
//! This module contains the server-side domain model: typed identifiers,
//! the event lifecycle state machine, the attendance classifier, the
//! concurrent document store, the user directory, and the activity bus
//! that broadcasts every mutation.

pub mod activity;
pub mod activity_bus;
pub mod attendance;
pub mod event;
pub mod event_store;
pub mod ids;
pub mod user;
pub mod user_directory;

pub use activity::ActivityEvent;
pub use activity_bus::ActivityBus;
pub use attendance::{AttendanceRecord, CheckInStatus, Registration, classify_check_in};
pub use event::{Event, EventPatch, EventStatus, NewEvent};
pub use event_store::{EventFilter, EventStore, RemovedEvent};
pub use ids::{EventId, UserId};
pub use user::{Actor, Role, User};
pub use user_directory::UserDirectory;
