// File: manager/src/web/server.rs
use crate::web::{handlers, AppState};
use anyhow::{anyhow, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Serve the API until `shutdown` resolves.
pub async fn start_web_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === ADMINISTRATION ROUTES ===
        .route("/api/maintenance/end", post(handlers::end_maintenance))
        .route("/api/maintenance/status", get(handlers::get_maintenance_status))
        .route(
            "/api/maintenance/schedule",
            get(handlers::get_maintenance_schedule),
        )
        // === PROXY BRIDGE ROUTES ===
        .route("/api/sessions", post(handlers::register_session))
        .route("/api/sessions/{principal_id}", delete(handlers::unregister_session))
        .route(
            "/api/sessions/{principal_id}/directives",
            get(handlers::drain_session_directives),
        )
        .route("/api/server-status", get(handlers::get_server_status))
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
