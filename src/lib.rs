#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # Duel Server
//!
//! A lightweight, in-memory WebSocket server for a two-player card duel game: lobby matching,
//! a phased round state machine, and a disconnect/reconnect subsystem.
//!
//! No database, no cloud services. Run the binary, connect via WebSocket.

/// Server configuration loading and validation
pub mod config;

/// Card deck and round resolution
pub mod deck;

/// Core error type shared by the game logic
pub mod error;

/// The per-lobby actor task owning a session's mailbox loop
pub mod lobby_actor;

/// Lobby creation, join/rejoin, and connection identity bookkeeping
pub mod lobby_registry;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Per-player hand and swap-budget state
pub mod player;

/// Wire protocol message definitions
pub mod protocol;

/// Disconnect/reconnect window tracking
pub mod reconnect;

/// Game session lifecycle: phases, timers, round resolution
pub mod session;

/// The session phase state machine
pub mod state_machine;

/// Cancelable, generation-stamped countdown timers
pub mod timer;

/// WebSocket connection handling
pub mod websocket;
