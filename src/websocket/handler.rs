use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;

use crate::lobby_registry::LobbyRegistry;

use super::connection::handle_socket;

/// Upgrades an HTTP connection to a WebSocket and hands it off to the per-connection loop.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<LobbyRegistry>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}
