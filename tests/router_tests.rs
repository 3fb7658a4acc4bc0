//! Router-level checks using `axum-test`: HTTP endpoints alongside the WebSocket upgrade route.

use std::sync::Arc;

use axum_test::TestServer;
use card_duel_server::lobby_registry::LobbyRegistry;
use card_duel_server::metrics::ServerMetrics;
use card_duel_server::session::SessionTimings;
use card_duel_server::websocket;

fn build_server() -> TestServer {
    let registry = Arc::new(LobbyRegistry::new(
        SessionTimings::default(),
        Arc::new(ServerMetrics::new()),
    ));
    let app = websocket::create_router("*").with_state(registry);
    TestServer::new(app).expect("router builds into a test server")
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = build_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn metrics_endpoint_returns_zeroed_counters_for_a_fresh_registry() {
    let server = build_server();
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["lobbies_created"], 0);
    assert_eq!(body["sessions_started"], 0);
}
