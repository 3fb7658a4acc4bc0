//! The per-lobby actor: the only task that ever touches a given lobby's `Session`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::metrics::ServerMetrics;
use crate::protocol::messages::{ClientEvent, Outbound, Recipient, ServerEvent};
use crate::reconnect::{ReconnectTracker, DISCONNECT_NOTIFY_GRACE_SECS};
use crate::session::{Session, TimerEvent};

pub enum LobbyCommand {
    Inbound(Uuid, ClientEvent),
    Disconnected(Uuid),
    Reconnect(Uuid, Uuid),
    Leave(Uuid),
    TimerEvent(TimerEvent),
    ReconnectExpired(Uuid),
    DisconnectNotifyGraceElapsed(Uuid),
    ResumeRoundStart,
}

pub type LobbyMailbox = mpsc::UnboundedSender<LobbyCommand>;

pub struct LobbyActorHandles {
    pub connections: Arc<DashMap<Uuid, mpsc::UnboundedSender<ServerEvent>>>,
    pub reconnect: Arc<ReconnectTracker>,
    pub lobbies: Arc<DashMap<String, Mutex<crate::lobby_registry::LobbyEntry>>>,
    pub metrics: Arc<ServerMetrics>,
}

/// Spawns the actor owning `session`. The caller must have constructed `session` with its
/// `on_timer_event` sink wired to `tx.clone()` (the other half of `rx`) before calling this, so
/// that timer callbacks re-enter the very mailbox this loop drains.
pub fn spawn(
    lobby_id: String,
    mut session: Session,
    tx: LobbyMailbox,
    mut rx: mpsc::UnboundedReceiver<LobbyCommand>,
    handles: LobbyActorHandles,
) {
    tokio::spawn(async move {
        let initial = session.start();
        dispatch(&handles.connections, &session, initial);

        while let Some(cmd) = rx.recv().await {
            let events = match cmd {
                LobbyCommand::Inbound(player_id, event) => {
                    handle_inbound(&mut session, player_id, event)
                }
                LobbyCommand::Disconnected(player_id) => {
                    handles.metrics.disconnects_registered.inc();
                    handle_disconnected(&mut session, player_id, &tx, &handles.reconnect, &lobby_id)
                        .await
                }
                LobbyCommand::Reconnect(player_id, connection_id) => {
                    handle_reconnect(
                        &mut session,
                        player_id,
                        connection_id,
                        &tx,
                        &handles.reconnect,
                        &handles.metrics,
                    )
                    .await
                }
                LobbyCommand::Leave(player_id) => handle_leave(&mut session, player_id),
                LobbyCommand::TimerEvent(ev) => session.handle_timer_event(ev),
                LobbyCommand::ReconnectExpired(player_id) => {
                    handles.metrics.reconnect_windows_expired.inc();
                    handle_expired(&mut session, player_id)
                }
                LobbyCommand::DisconnectNotifyGraceElapsed(player_id) => {
                    handle_grace_elapsed(&session, player_id)
                }
                LobbyCommand::ResumeRoundStart => session.begin_round(),
            };
            dispatch(&handles.connections, &session, events);

            if session.is_completed() {
                handles.metrics.sessions_completed.inc();
                handles.reconnect.clear_lobby(&lobby_id).await;
                handles.lobbies.remove(&lobby_id);
                break;
            }
        }
    });
}

fn dispatch(
    connections: &DashMap<Uuid, mpsc::UnboundedSender<ServerEvent>>,
    session: &Session,
    events: Vec<Outbound>,
) {
    for outbound in events {
        match outbound.to {
            Recipient::Both => {
                for idx in 0..2 {
                    send_to(connections, session.player_id_at(idx), outbound.event.clone());
                }
            }
            Recipient::Player(idx) => {
                send_to(connections, session.player_id_at(idx), outbound.event.clone());
            }
        }
    }
}

fn send_to(connections: &DashMap<Uuid, mpsc::UnboundedSender<ServerEvent>>, player_id: Uuid, event: ServerEvent) {
    if let Some(sender) = connections.get(&player_id) {
        let _ = sender.send(event);
    }
}

fn handle_inbound(session: &mut Session, player_id: Uuid, event: ClientEvent) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    let result = match event {
        ClientEvent::PreviewReady => Ok(session.handle_preview_ready(idx)),
        ClientEvent::SetSequence(payload) => {
            let cards = resolve_cards(session, idx, &payload.card_ids);
            match cards {
                Some(cards) => session.handle_set_sequence(idx, cards),
                None => Err(crate::error::CoreError::InvalidInput(
                    "unknown card id in sequence".into(),
                )),
            }
        }
        ClientEvent::SwapCards(payload) => session.handle_swap_cards(idx, payload.pos1, payload.pos2),
        ClientEvent::SkipSwap => session.handle_skip_swap(idx),
        ClientEvent::ContinueRound => session.handle_continue(idx),
        ClientEvent::LeaveLobby | ClientEvent::PlayAgain => Ok(handle_leave(session, player_id)),
        ClientEvent::CreateLobby(_) | ClientEvent::JoinLobby(_) | ClientEvent::Reconnect(_) => {
            Err(crate::error::CoreError::IllegalTransition)
        }
    };
    match result {
        Ok(events) => events,
        Err(crate::error::CoreError::IllegalTransition) => Vec::new(),
        Err(crate::error::CoreError::RuleViolation(msg)) => {
            vec![Outbound::to_player(idx, ServerEvent::SwapError { message: msg })]
        }
        Err(other) => vec![Outbound::to_player(
            idx,
            ServerEvent::Error {
                message: other.to_string(),
            },
        )],
    }
}

fn resolve_cards(
    session: &Session,
    idx: usize,
    card_ids: &[Uuid],
) -> Option<Vec<crate::deck::Card>> {
    let hand = session.hand_of(idx);
    card_ids
        .iter()
        .map(|id| hand.iter().find(|c| &c.id == id).copied())
        .collect()
}

fn handle_leave(session: &mut Session, player_id: Uuid) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    if session.is_completed() {
        return Vec::new();
    }
    let mut events = session.end_by_disconnect(idx);
    events.push(Outbound::to_player(1 - idx, ServerEvent::OpponentLeft));
    events
}

async fn handle_disconnected(
    session: &mut Session,
    player_id: Uuid,
    tx: &LobbyMailbox,
    reconnect: &Arc<ReconnectTracker>,
    lobby_id: &str,
) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    if session.is_completed() {
        return Vec::new();
    }
    session.mark_disconnected(idx);

    let other_idx = 1 - idx;
    if session.is_disconnected(other_idx) {
        session.force_complete_silently();
        return Vec::new();
    }

    let silent = session.phase() == crate::state_machine::Phase::Reveal;
    let expiry_tx = tx.clone();
    let notify_tx = tx.clone();
    let on_expiry = move || {
        let _ = expiry_tx.send(LobbyCommand::ReconnectExpired(player_id));
    };
    let on_notify = if silent {
        None
    } else {
        Some(move || {
            let _ = notify_tx.send(LobbyCommand::DisconnectNotifyGraceElapsed(player_id));
        })
    };
    reconnect
        .register_disconnection(player_id, lobby_id.to_string(), on_expiry, on_notify)
        .await;
    Vec::new()
}

fn handle_grace_elapsed(session: &Session, player_id: Uuid) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    if !session.is_disconnected(idx) {
        return Vec::new();
    }
    let remaining = crate::reconnect::RECONNECT_WINDOW_SECS
        .saturating_sub(DISCONNECT_NOTIFY_GRACE_SECS);
    session.notify_opponent_disconnected(idx, remaining)
}

fn handle_expired(session: &mut Session, player_id: Uuid) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    if session.is_completed() || !session.is_disconnected(idx) {
        return Vec::new();
    }
    session.end_by_disconnect(idx)
}

async fn handle_reconnect(
    session: &mut Session,
    player_id: Uuid,
    connection_id: Uuid,
    tx: &LobbyMailbox,
    reconnect: &Arc<ReconnectTracker>,
    metrics: &ServerMetrics,
) -> Vec<Outbound> {
    let Some(idx) = session.player_index(player_id) else {
        return Vec::new();
    };
    let other_idx = 1 - idx;
    let opponent_live = !session.is_disconnected(other_idx);
    let opponent_remaining = if opponent_live {
        0
    } else {
        reconnect
            .get(session.player_id_at(other_idx))
            .await
            .map(|r| r.remaining_secs())
            .unwrap_or(0)
    };

    let (events, should_resume_round) =
        session.mark_reconnected(idx, connection_id, opponent_live, opponent_remaining);
    reconnect.complete(player_id).await;
    metrics.reconnections_completed.inc();

    if should_resume_round {
        let resume_tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = resume_tx.send(LobbyCommand::ResumeRoundStart);
        });
    }
    events
}
