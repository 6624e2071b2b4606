//! Service layer: business logic orchestration.
//!
//! [`EventService`] applies lifecycle transitions against the
//! [`crate::domain::EventStore`] and emits activity through the
//! [`crate::domain::ActivityBus`]. [`AuthService`] manages accounts and
//! bearer tokens.

pub mod auth_service;
pub mod event_service;

pub use auth_service::AuthService;
pub use event_service::{Approval, EventService};
