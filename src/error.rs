//! Error taxonomy shared by the session core and the transport layer.

use thiserror::Error;

/// Errors raised by the game core (deck, session, registry, reconnect tracker).
///
/// Transport code maps most of these onto a wire `error`/`swapError` event; only
/// [`CoreError::ProgrammerError`] indicates a bug and is logged rather than shown to a client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("action not allowed in the current phase")]
    IllegalTransition,

    #[error("rule violation: {0}")]
    RuleViolation(String),

    #[error("lobby not found")]
    LobbyNotFound,

    #[error("lobby is full")]
    LobbyFull,

    #[error("session already completed")]
    SessionCompleted,

    #[error("invalid reconnection attempt")]
    ReconnectRejected,

    #[error("internal error: {0}")]
    ProgrammerError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
