//! Koinonia Web Server
//!
//! Axum-based REST API for the cell-church management system. The tenant id
//! is an explicit path segment on every API route; no ambient tenant state.

pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use koinonia_db::DbPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Consolidation
        .route("/tenants/{tenant}/decisions", post(routes::consolidation::register_decision))
        .route("/tenants/{tenant}/converts", get(routes::consolidation::list_converts))
        .route("/tenants/{tenant}/converts/{id}", get(routes::consolidation::get_convert))
        .route("/tenants/{tenant}/converts/{id}/status", put(routes::consolidation::update_status))
        .route("/tenants/{tenant}/converts/{id}/events", post(routes::consolidation::log_event))
        .route("/tenants/{tenant}/converts/{id}/events", get(routes::consolidation::list_events))
        .route("/tenants/{tenant}/converts/{id}/risk", post(routes::consolidation::compute_risk))
        .route("/tenants/{tenant}/consolidation/funnel", get(routes::consolidation::get_funnel))
        .route("/tenants/{tenant}/consolidation/stats", get(routes::consolidation::get_stats))
        // Cells
        .route("/tenants/{tenant}/cells", post(routes::cells::create_cell))
        .route("/tenants/{tenant}/cells", get(routes::cells::list_cells))
        .route("/tenants/{tenant}/cells/{id}", get(routes::cells::get_cell))
        .route("/tenants/{tenant}/cells/{id}/members", post(routes::cells::add_member))
        .route("/tenants/{tenant}/cells/{id}/meetings", post(routes::cells::record_meeting))
        .route("/tenants/{tenant}/cells/{id}/meetings", get(routes::cells::list_meetings))
        // Supervision
        .route("/tenants/{tenant}/supervisions", post(routes::supervision::create_supervision))
        .route("/tenants/{tenant}/supervisions", get(routes::supervision::list_supervisions))
        .route("/tenants/{tenant}/supervisions/{id}/dashboard", get(routes::supervision::get_dashboard))
        .route("/tenants/{tenant}/supervisions/{id}/status", get(routes::supervision::get_status))
        .route("/tenants/{tenant}/supervisions/{id}/visits", post(routes::supervision::record_visit))
        .route("/tenants/{tenant}/supervisions/{id}/meetings", post(routes::supervision::record_meeting))
        .route("/tenants/{tenant}/supervision-alerts/generate", post(routes::supervision::generate_alerts))
        .route("/tenants/{tenant}/supervision-alerts", get(routes::supervision::list_alerts))
        .route("/tenants/{tenant}/supervision-alerts/{id}/resolve", put(routes::supervision::resolve_alert))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(db: Arc<DbPool>, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(db);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Web server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
