//! Lobby creation, join/rejoin, leave, and the connection<->lobby<->player identity maps.
//!
//! Lobby state has two tiers: a lightweight `Waiting` roster (no `Session` yet, mutated directly
//! under a short-lived per-lobby lock) and an `Active` lobby whose `Session` is owned exclusively
//! by its [`crate::lobby_actor`] task, reached only through its mailbox.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::lobby_actor::{self, LobbyActorHandles, LobbyCommand, LobbyMailbox};
use crate::metrics::ServerMetrics;
use crate::player::Player;
use crate::protocol::messages::{ClientEvent, PlayerSummary, ServerEvent};
use crate::protocol::{lobby_codes, validation};
use crate::reconnect::ReconnectTracker;
use crate::session::{Session, SessionTimings};

const MAX_PLAYERS_PER_LOBBY: usize = 2;

struct Slot {
    player_id: Uuid,
    name: String,
}

struct WaitingLobby {
    slots: Vec<Slot>,
    allowed: HashSet<Uuid>,
    created_at: DateTime<Utc>,
}

struct ActiveLobby {
    mailbox: LobbyMailbox,
    player_ids: [Uuid; 2],
    allowed: HashSet<Uuid>,
}

pub enum LobbyEntry {
    Waiting(WaitingLobby),
    Active(ActiveLobby),
}

pub struct LobbyRegistry {
    lobbies: Arc<DashMap<String, Mutex<LobbyEntry>>>,
    connections: Arc<DashMap<Uuid, mpsc::UnboundedSender<ServerEvent>>>,
    connection_lobby: Arc<DashMap<Uuid, String>>,
    reconnect: Arc<ReconnectTracker>,
    timings: SessionTimings,
    metrics: Arc<ServerMetrics>,
}

impl LobbyRegistry {
    pub fn new(timings: SessionTimings, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            lobbies: Arc::new(DashMap::new()),
            connections: Arc::new(DashMap::new()),
            connection_lobby: Arc::new(DashMap::new()),
            reconnect: Arc::new(ReconnectTracker::new()),
            timings,
            metrics,
        }
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }

    pub fn metrics_snapshot(&self) -> crate::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn handles(&self) -> LobbyActorHandles {
        LobbyActorHandles {
            connections: self.connections.clone(),
            reconnect: self.reconnect.clone(),
            lobbies: self.lobbies.clone(),
            metrics: self.metrics.clone(),
        }
    }

    pub async fn create_lobby(
        &self,
        conn_sender: mpsc::UnboundedSender<ServerEvent>,
        player_name: &str,
        requested_player_id: Option<&str>,
    ) -> (String, Uuid) {
        let name = validation::sanitize_player_name(player_name);
        let player_id = resolve_player_id(requested_player_id);

        let lobby_id = lobby_codes::generate_unique(|c| self.lobbies.contains_key(c))
            .unwrap_or_else(lobby_codes::generate);

        self.connections.insert(player_id, conn_sender);
        self.connection_lobby.insert(player_id, lobby_id.clone());

        let mut allowed = HashSet::new();
        allowed.insert(player_id);
        self.lobbies.insert(
            lobby_id.clone(),
            Mutex::new(LobbyEntry::Waiting(WaitingLobby {
                slots: vec![Slot {
                    player_id,
                    name: name.clone(),
                }],
                allowed,
                created_at: Utc::now(),
            })),
        );
        self.metrics.lobbies_created.inc();
        info!(lobby_id = %lobby_id, %player_id, "lobby created");

        self.send(player_id, ServerEvent::LobbyCreated {
            lobby_id: lobby_id.clone(),
            you: PlayerSummary {
                player_id,
                name,
            },
        });
        (lobby_id, player_id)
    }

    pub async fn join_lobby(
        &self,
        conn_sender: mpsc::UnboundedSender<ServerEvent>,
        lobby_id_raw: &str,
        player_name: &str,
        requested_player_id: Option<&str>,
    ) -> CoreResult<Uuid> {
        let Some(lobby_id) = validation::normalize_lobby_id(lobby_id_raw) else {
            return Err(CoreError::InvalidInput("invalid lobby id".into()));
        };
        let name = validation::sanitize_player_name(player_name);
        let Some(entry_lock) = self.lobbies.get(&lobby_id) else {
            return Err(CoreError::LobbyNotFound);
        };

        let rejoin_candidate = requested_player_id
            .filter(|raw| validation::is_valid_player_id_string(raw))
            .and_then(|raw| Uuid::parse_str(raw).ok());

        let mut entry = entry_lock.lock().await;
        let mut start_data: Option<(Vec<Slot>, HashSet<Uuid>)> = None;
        let outcome: CoreResult<Uuid> = match &mut *entry {
            LobbyEntry::Waiting(waiting) => {
                if let Some(candidate) = rejoin_candidate {
                    if waiting.allowed.contains(&candidate) {
                        self.connections.insert(candidate, conn_sender);
                        self.connection_lobby.insert(candidate, lobby_id.clone());
                        self.send(
                            candidate,
                            ServerEvent::LobbyJoined {
                                lobby_id: lobby_id.clone(),
                                you: PlayerSummary { player_id: candidate, name },
                                opponent: waiting
                                    .slots
                                    .iter()
                                    .find(|s| s.player_id != candidate)
                                    .map(|s| PlayerSummary {
                                        player_id: s.player_id,
                                        name: s.name.clone(),
                                    }),
                            },
                        );
                        return Ok(candidate);
                    }
                }
                if waiting.slots.len() >= MAX_PLAYERS_PER_LOBBY {
                    return Err(CoreError::LobbyFull);
                }
                let player_id = resolve_player_id(requested_player_id);
                self.connections.insert(player_id, conn_sender);
                self.connection_lobby.insert(player_id, lobby_id.clone());
                waiting.allowed.insert(player_id);
                waiting.slots.push(Slot {
                    player_id,
                    name: name.clone(),
                });

                let opponent = waiting
                    .slots
                    .iter()
                    .find(|s| s.player_id != player_id)
                    .map(|s| PlayerSummary {
                        player_id: s.player_id,
                        name: s.name.clone(),
                    });
                self.send(
                    player_id,
                    ServerEvent::LobbyJoined {
                        lobby_id: lobby_id.clone(),
                        you: PlayerSummary { player_id, name: name.clone() },
                        opponent: opponent.clone(),
                    },
                );
                if let Some(opponent) = &opponent {
                    self.send(
                        opponent.player_id,
                        ServerEvent::PlayerJoined {
                            opponent: PlayerSummary { player_id, name },
                        },
                    );
                }

                if waiting.slots.len() == MAX_PLAYERS_PER_LOBBY {
                    start_data = Some((std::mem::take(&mut waiting.slots), waiting.allowed.clone()));
                }
                self.metrics.lobbies_joined.inc();
                Ok(player_id)
            }
            LobbyEntry::Active(active) => {
                let Some(candidate) = rejoin_candidate.filter(|c| active.allowed.contains(c)) else {
                    return Err(CoreError::LobbyFull);
                };
                self.connections.insert(candidate, conn_sender);
                self.connection_lobby.insert(candidate, lobby_id.clone());
                let connection_id = Uuid::new_v4();
                let _ = active
                    .mailbox
                    .send(LobbyCommand::Reconnect(candidate, connection_id));
                Ok(candidate)
            }
        };
        if let Some((slots, allowed)) = start_data {
            self.start_session(&lobby_id, slots, allowed, &mut *entry);
        }
        outcome
    }

    pub async fn reconnect(
        &self,
        conn_sender: mpsc::UnboundedSender<ServerEvent>,
        lobby_id_raw: &str,
        player_id_raw: &str,
    ) -> CoreResult<()> {
        let Some(lobby_id) = validation::normalize_lobby_id(lobby_id_raw) else {
            return Err(CoreError::InvalidInput("invalid lobby id".into()));
        };
        if !validation::is_valid_player_id_string(player_id_raw) {
            return Err(CoreError::InvalidInput("invalid player id".into()));
        }
        let Ok(player_id) = Uuid::parse_str(player_id_raw) else {
            return Err(CoreError::InvalidInput("invalid player id".into()));
        };
        if !self.reconnect.validate(player_id, &lobby_id).await {
            return Err(CoreError::ReconnectRejected);
        }
        let Some(entry_lock) = self.lobbies.get(&lobby_id) else {
            return Err(CoreError::LobbyNotFound);
        };
        let entry = entry_lock.lock().await;
        let LobbyEntry::Active(active) = &*entry else {
            return Err(CoreError::ReconnectRejected);
        };
        self.connections.insert(player_id, conn_sender);
        self.connection_lobby.insert(player_id, lobby_id.clone());
        let connection_id = Uuid::new_v4();
        let _ = active
            .mailbox
            .send(LobbyCommand::Reconnect(player_id, connection_id));
        Ok(())
    }

    pub async fn dispatch(&self, player_id: Uuid, event: ClientEvent) {
        let Some(lobby_id) = self.connection_lobby.get(&player_id).map(|r| r.clone()) else {
            return;
        };
        let Some(entry_lock) = self.lobbies.get(&lobby_id) else {
            return;
        };
        let entry = entry_lock.lock().await;
        if let LobbyEntry::Active(active) = &*entry {
            let _ = active.mailbox.send(LobbyCommand::Inbound(player_id, event));
        }
    }

    pub async fn leave(&self, player_id: Uuid) {
        let Some(lobby_id) = self.connection_lobby.get(&player_id).map(|r| r.clone()) else {
            return;
        };
        let Some(entry_lock) = self.lobbies.get(&lobby_id) else {
            return;
        };
        let entry = entry_lock.lock().await;
        match &*entry {
            LobbyEntry::Active(active) => {
                let _ = active.mailbox.send(LobbyCommand::Leave(player_id));
            }
            LobbyEntry::Waiting(_) => {
                drop(entry);
                self.lobbies.remove(&lobby_id);
            }
        }
        self.connections.remove(&player_id);
        self.connection_lobby.remove(&player_id);
    }

    /// Called when a websocket connection drops without an explicit `leaveLobby`.
    pub async fn connection_closed(&self, player_id: Uuid) {
        let Some(lobby_id) = self.connection_lobby.get(&player_id).map(|r| r.clone()) else {
            return;
        };
        self.connections.remove(&player_id);
        let Some(entry_lock) = self.lobbies.get(&lobby_id) else {
            return;
        };
        let entry = entry_lock.lock().await;
        match &*entry {
            LobbyEntry::Active(active) => {
                let _ = active.mailbox.send(LobbyCommand::Disconnected(player_id));
            }
            LobbyEntry::Waiting(_) => {
                drop(entry);
                self.lobbies.remove(&lobby_id);
                self.connection_lobby.remove(&player_id);
            }
        }
    }

    fn start_session(
        &self,
        lobby_id: &str,
        slots: Vec<Slot>,
        allowed: HashSet<Uuid>,
        entry: &mut LobbyEntry,
    ) {
        let conn0 = Uuid::new_v4();
        let conn1 = Uuid::new_v4();
        let player0 = Player::new(slots[0].player_id, slots[0].name.clone(), conn0);
        let player1 = Player::new(slots[1].player_id, slots[1].name.clone(), conn1);
        let player_ids = [slots[0].player_id, slots[1].player_id];

        let (tx, rx) = mpsc::unbounded_channel::<LobbyCommand>();
        let sink_tx = tx.clone();
        let on_timer_event = Arc::new(move |ev: crate::session::TimerEvent| {
            let _ = sink_tx.send(LobbyCommand::TimerEvent(ev));
        });
        let session = Session::new(
            lobby_id.to_string(),
            player0,
            player1,
            self.timings,
            on_timer_event,
        );
        lobby_actor::spawn(lobby_id.to_string(), session, tx.clone(), rx, self.handles());

        *entry = LobbyEntry::Active(ActiveLobby {
            mailbox: tx,
            player_ids,
            allowed,
        });
        self.metrics.sessions_started.inc();
    }

    fn send(&self, player_id: Uuid, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    /// Periodic sweep removing lobbies with no live connections and no pending reconnects, in
    /// case a connection drop bypassed `connection_closed` (e.g. an abrupt process kill on the
    /// client side that never reached the transport layer).
    pub async fn sweep_stale_lobbies(&self) {
        let stale: Vec<String> = self
            .lobbies
            .iter()
            .filter_map(|entry| {
                let lobby_id = entry.key().clone();
                match entry.value().try_lock() {
                    Ok(guard) => match &*guard {
                        LobbyEntry::Waiting(w) => {
                            let all_dead = w
                                .slots
                                .iter()
                                .all(|s| !self.connections.contains_key(&s.player_id));
                            all_dead.then_some(lobby_id)
                        }
                        LobbyEntry::Active(a) => {
                            let all_dead = a
                                .player_ids
                                .iter()
                                .all(|id| !self.connections.contains_key(id));
                            all_dead.then_some(lobby_id)
                        }
                    },
                    Err(_) => None,
                }
            })
            .collect();
        for lobby_id in stale {
            warn!(lobby_id = %lobby_id, "sweeping stale lobby with no live connections");
            self.metrics.lobbies_swept_stale.inc();
            self.reconnect.clear_lobby(&lobby_id).await;
            self.lobbies.remove(&lobby_id);
        }
    }
}

fn resolve_player_id(requested: Option<&str>) -> Uuid {
    requested
        .filter(|raw| validation::is_valid_player_id_string(raw))
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(Uuid::new_v4)
}
