//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod event;
pub mod proposal;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(proposal::routes())
        .merge(admin::routes())
        .merge(event::routes())
        .merge(attendance::routes())
}
