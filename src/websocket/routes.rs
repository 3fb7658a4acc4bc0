use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;

use crate::lobby_registry::LobbyRegistry;
use crate::metrics::MetricsSnapshot;

use super::handler::websocket_handler;

/// Builds the router: WebSocket upgrade, a liveness probe, and a JSON metrics snapshot.
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<LobbyRegistry>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn metrics_handler(
    State(registry): State<Arc<LobbyRegistry>>,
) -> Json<MetricsSnapshot> {
    Json(registry.metrics_snapshot())
}
