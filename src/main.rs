//! campus-events server entry point.
//!
//! Starts the Axum HTTP server with the REST API and, when enabled, the
//! PostgreSQL activity recorder.

use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use campus_events::api;
use campus_events::app_state::AppState;
use campus_events::config::{LogFormat, ServiceConfig};
use campus_events::persistence::{
    PostgresActivityLog, spawn_activity_recorder, spawn_retention_sweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("loading configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting campus-events");
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; signing tokens with the development secret");
    }

    // Build domain and service layers
    let mut app_state = AppState::in_memory(
        &config.jwt_secret,
        config.token_ttl_secs,
        config.activity_bus_capacity,
    );

    if let Some(admin) = &config.admin {
        app_state
            .auth_service
            .ensure_admin(&admin.name, &admin.email, &admin.password)
            .await
            .context("creating bootstrap admin")?;
    }

    // Attach the activity log
    if config.persistence_enabled {
        let log = PostgresActivityLog::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        spawn_activity_recorder(log.clone(), app_state.activity_bus.subscribe());
        if spawn_retention_sweeper(log.clone(), config.activity_retention_days).is_none() {
            tracing::info!("activity retention disabled");
        }
        app_state = app_state.with_activity_log(log);
        tracing::info!("activity persistence enabled");
    } else {
        tracing::info!("activity persistence disabled");
    }

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .merge(swagger_ui())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[cfg(feature = "swagger-ui")]
fn swagger_ui() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", api::ApiDoc::openapi())
        .into()
}

#[cfg(not(feature = "swagger-ui"))]
fn swagger_ui() -> Router<AppState> {
    Router::new()
}
