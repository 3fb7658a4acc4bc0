use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::lobby_registry::LobbyRegistry;
use crate::protocol::{ClientEvent, ServerEvent};

pub(super) async fn handle_socket(socket: WebSocket, registry: Arc<LobbyRegistry>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize outbound event");
                }
            }
        }
        let _ = sink.close().await;
    });

    let mut player_id: Option<Uuid> = None;

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let event: ClientEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(err) => {
                let _ = tx.send(ServerEvent::Error {
                    message: format!("malformed message: {err}"),
                });
                continue;
            }
        };

        match event {
            ClientEvent::CreateLobby(payload) if player_id.is_none() => {
                let (_, assigned) = registry
                    .create_lobby(tx.clone(), &payload.player_name, payload.player_id.as_deref())
                    .await;
                player_id = Some(assigned);
            }
            ClientEvent::JoinLobby(payload) if player_id.is_none() => {
                match registry
                    .join_lobby(
                        tx.clone(),
                        &payload.lobby_id,
                        &payload.player_name,
                        payload.player_id.as_deref(),
                    )
                    .await
                {
                    Ok(assigned) => player_id = Some(assigned),
                    Err(err) => {
                        let _ = tx.send(ServerEvent::Error {
                            message: err.to_string(),
                        });
                    }
                }
            }
            ClientEvent::Reconnect(payload) if player_id.is_none() => {
                match registry
                    .reconnect(tx.clone(), &payload.lobby_id, &payload.player_id)
                    .await
                {
                    Ok(()) => {
                        if let Ok(id) = Uuid::parse_str(&payload.player_id) {
                            player_id = Some(id);
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(ServerEvent::Error {
                            message: err.to_string(),
                        });
                    }
                }
            }
            ClientEvent::CreateLobby(_) | ClientEvent::JoinLobby(_) | ClientEvent::Reconnect(_) => {
                let _ = tx.send(ServerEvent::Error {
                    message: "already joined a lobby on this connection".into(),
                });
            }
            other => {
                if let Some(id) = player_id {
                    registry.dispatch(id, other).await;
                }
            }
        }
    }

    if let Some(id) = player_id {
        registry.connection_closed(id).await;
    }
    send_task.abort();
}
