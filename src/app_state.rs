//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::ActivityBus;
use crate::persistence::PostgresActivityLog;
use crate::service::{AuthService, EventService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event service for all lifecycle, registration and check-in logic.
    pub event_service: Arc<EventService>,
    /// Account registration and bearer-token validation.
    pub auth_service: Arc<AuthService>,
    /// Activity bus every mutation is published on.
    pub activity_bus: ActivityBus,
    /// Persisted activity log; `None` when persistence is disabled.
    pub activity_log: Option<PostgresActivityLog>,
}

impl AppState {
    /// Wires the in-memory services around a fresh store and directory.
    ///
    /// Used by the binary and by integration tests that need a router
    /// without a database.
    #[must_use]
    pub fn in_memory(jwt_secret: &str, token_ttl_secs: u64, bus_capacity: usize) -> Self {
        let store = Arc::new(crate::domain::EventStore::new());
        let users = Arc::new(crate::domain::UserDirectory::new());
        let activity_bus = ActivityBus::new(bus_capacity);
        let event_service = Arc::new(EventService::new(
            store,
            Arc::clone(&users),
            activity_bus.clone(),
        ));
        let auth_service = Arc::new(AuthService::new(users, jwt_secret, token_ttl_secs));
        Self {
            event_service,
            auth_service,
            activity_bus,
            activity_log: None,
        }
    }

    /// Attaches a persisted activity log.
    #[must_use]
    pub fn with_activity_log(mut self, log: PostgresActivityLog) -> Self {
        self.activity_log = Some(log);
        self
    }
}
