//! # campus-events
//!
//! REST service for university events: students propose events, admins
//! approve or reject them, attendees register, and staff check attendees
//! in.
//!
//! The core is the event lifecycle state machine
//! (`draft → pending → approved | rejected`, with open/closed registration
//! on approved events) and the check-in classifier that labels an arrival
//! `early`, `on_time` or `late` relative to the event start.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP + bearer token)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── EventService, AuthService (service/)
//!     ├── ActivityBus (domain/)
//!     │
//!     ├── EventStore, UserDirectory (domain/)
//!     │
//!     └── PostgreSQL activity log (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
