//! WebSocket transport: upgrade handling, per-connection framing, and HTTP routes.
//!
//! - handler: WebSocket upgrade entry point
//! - connection: per-connection receive/send loop
//! - routes: router assembly (`/ws`, `/health`, `/metrics`)

mod connection;
mod handler;
mod routes;

pub use handler::websocket_handler;
pub use routes::{create_router, health_handler, metrics_handler};
