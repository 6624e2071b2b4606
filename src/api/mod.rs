//! REST API layer: route handlers, DTOs, extractors and router
//! composition.
//!
//! All endpoints are mounted under `/api`; `/health` stays at the root.

pub mod dto;
pub mod extract;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
}

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "campus-events",
        description = "University event proposals, admin approval, registration and attendance check-in."
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::proposal::create_proposal,
        handlers::proposal::list_own_proposals,
        handlers::proposal::update_proposal,
        handlers::proposal::submit_proposal,
        handlers::proposal::cancel_submission,
        handlers::admin::list_pending,
        handlers::admin::approve_event,
        handlers::admin::reject_event,
        handlers::admin::event_activity,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::delete_event,
        handlers::event::close_registration,
        handlers::event::open_registration,
        handlers::event::register_attendee,
        handlers::event::unregister_attendee,
        handlers::attendance::check_in,
        handlers::attendance::list_attendance,
        handlers::attendance::find_attendance,
        handlers::system::health_handler,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Accounts and bearer tokens"),
        (name = "Proposals", description = "Drafting and submitting events"),
        (name = "Admin", description = "Reviewing proposals"),
        (name = "Events", description = "Catalogue and registration"),
        (name = "Attendance", description = "Check-in and attendance records"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
