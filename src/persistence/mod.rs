//! Persistence layer: PostgreSQL activity log.
//!
//! Event documents live in the in-memory [`crate::domain::EventStore`];
//! this layer durably appends every [`crate::domain::ActivityEvent`] so
//! admins can audit an event's history. The concrete implementation uses
//! `sqlx::PgPool` for async PostgreSQL access.

pub mod models;
pub mod postgres;
pub mod recorder;

pub use postgres::PostgresActivityLog;
pub use recorder::{ActivitySink, spawn_activity_recorder, spawn_retention_sweeper};
