//! Wire protocol: inbound (`ClientEvent`) and outbound (`ServerEvent`) tagged message unions.
//!
//! Follows this codebase's established `#[serde(tag = "type", content = "data")]` encoding for
//! its client/server message enums.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deck::Card;
use crate::state_machine::Phase;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "createLobby")]
    CreateLobby(CreateLobbyPayload),
    #[serde(rename = "joinLobby")]
    JoinLobby(JoinLobbyPayload),
    #[serde(rename = "previewReady")]
    PreviewReady,
    #[serde(rename = "setSequence")]
    SetSequence(SetSequencePayload),
    #[serde(rename = "swapCards")]
    SwapCards(SwapCardsPayload),
    #[serde(rename = "skipSwap")]
    SkipSwap,
    #[serde(rename = "continueRound")]
    ContinueRound,
    #[serde(rename = "leaveLobby")]
    LeaveLobby,
    #[serde(rename = "playAgain")]
    PlayAgain,
    #[serde(rename = "reconnect")]
    Reconnect(ReconnectPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLobbyPayload {
    pub player_name: String,
    #[serde(default)]
    pub player_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinLobbyPayload {
    pub lobby_id: String,
    pub player_name: String,
    #[serde(default)]
    pub player_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetSequencePayload {
    pub card_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapCardsPayload {
    pub pos1: i64,
    pub pos2: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectPayload {
    pub lobby_id: String,
    pub player_id: String,
}

/// The recipient of an outbound event as produced by session/registry logic, resolved to an
/// actual connection id by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Player(usize),
    Both,
}

/// An event produced by session/registry logic paired with who should receive it. Never
/// serialized itself — only `event` crosses the wire, once `to` has been resolved to an actual
/// connection by the transport layer.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn to_player(index: usize, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Player(index),
            event,
        }
    }

    pub fn to_both(event: ServerEvent) -> Self {
        Self {
            to: Recipient::Both,
            event,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub player_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundResultPayload {
    pub round: u8,
    pub your_card: Card,
    pub opponent_card: Card,
    pub winner: Option<Uuid>,
    pub explanation: String,
    pub your_score: u8,
    pub opponent_score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconnectSnapshot {
    pub phase: Phase,
    pub current_round: u8,
    pub your_score: u8,
    pub your_swaps_remaining: u8,
    pub opponent_score: u8,
    pub opponent_swaps_remaining: u8,
    pub round_history: Vec<RoundResultPayload>,
    pub time_remaining: u64,
    pub your_upcoming_cards: Vec<Card>,
    pub your_hand: Vec<Card>,
    pub you: PlayerSummary,
    pub opponent: PlayerSummary,
    pub you_ready: bool,
    pub opponent_ready: bool,
    /// Only populated when `phase == Phase::Preview`.
    pub opponent_hand: Option<Vec<Card>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "lobbyCreated")]
    LobbyCreated {
        lobby_id: String,
        you: PlayerSummary,
    },
    #[serde(rename = "lobbyJoined")]
    LobbyJoined {
        lobby_id: String,
        you: PlayerSummary,
        opponent: Option<PlayerSummary>,
    },
    #[serde(rename = "playerJoined")]
    PlayerJoined { opponent: PlayerSummary },
    #[serde(rename = "cardsPreview")]
    CardsPreview {
        your_hand: Vec<Card>,
        opponent_hand: Vec<Card>,
        seconds: u64,
    },
    #[serde(rename = "previewTimerUpdate")]
    PreviewTimerUpdate { seconds_remaining: u64 },
    #[serde(rename = "opponentPreviewReady")]
    OpponentPreviewReady,
    #[serde(rename = "gameStart")]
    GameStart { seconds: u64 },
    #[serde(rename = "sequenceConfirmed")]
    SequenceConfirmed,
    #[serde(rename = "roundStart")]
    RoundStart {
        round: u8,
        seconds: u64,
        your_swaps_remaining: u8,
    },
    #[serde(rename = "timerUpdate")]
    TimerUpdate { seconds_remaining: u64 },
    #[serde(rename = "swapConfirmed")]
    SwapConfirmed {
        sequence: Vec<Card>,
        swaps_remaining: u8,
    },
    #[serde(rename = "swapError")]
    SwapError { message: String },
    #[serde(rename = "skipConfirmed")]
    SkipConfirmed,
    #[serde(rename = "opponentSwapped")]
    OpponentSwapped,
    #[serde(rename = "roundResult")]
    RoundResult(RoundResultPayload),
    #[serde(rename = "continueCountdown")]
    ContinueCountdown { seconds_remaining: u64 },
    #[serde(rename = "opponentContinued")]
    OpponentContinued,
    #[serde(rename = "gameEnd")]
    GameEnd {
        winner: Option<Uuid>,
        your_score: u8,
        opponent_score: u8,
        by_disconnect: bool,
    },
    #[serde(rename = "opponentDisconnected")]
    OpponentDisconnected { reconnect_seconds_remaining: u64 },
    #[serde(rename = "opponentReconnected")]
    OpponentReconnected,
    #[serde(rename = "opponentLeft")]
    OpponentLeft,
    #[serde(rename = "gameResumed")]
    GameResumed { phase: Phase },
    #[serde(rename = "reconnected")]
    Reconnected(Box<ReconnectSnapshot>),
    #[serde(rename = "error")]
    Error { message: String },
}

impl From<crate::error::CoreError> for ServerEvent {
    fn from(err: crate::error::CoreError) -> Self {
        ServerEvent::Error {
            message: err.to_string(),
        }
    }
}
