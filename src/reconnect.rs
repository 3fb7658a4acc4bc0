//! Per-player disconnect bookkeeping: expiry timers and a delayed opponent-notify timer.
//!
//! Closely modeled on this codebase's existing reconnection-window manager, specialized to the
//! two-player lobby shape and extended with the delayed notify timer the duel's reveal-phase
//! handling needs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const RECONNECT_WINDOW_SECS: u64 = 120;
pub const DISCONNECT_NOTIFY_GRACE_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct ReconnectRecord {
    pub lobby_id: String,
    pub disconnected_at: DateTime<Utc>,
}

impl ReconnectRecord {
    pub fn remaining_secs(&self) -> u64 {
        let elapsed = (Utc::now() - self.disconnected_at).num_seconds().max(0) as u64;
        RECONNECT_WINDOW_SECS.saturating_sub(elapsed)
    }
}

struct Entry {
    record: ReconnectRecord,
    expiry_handle: JoinHandle<()>,
    notify_handle: Option<JoinHandle<()>>,
}

/// Tracks every currently-disconnected player across all lobbies, firing callbacks on expiry
/// and (optionally, after a short grace delay) on "still gone" notification.
pub struct ReconnectTracker {
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl Default for ReconnectTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectTracker {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a disconnection for `player_id` in `lobby_id`. `on_expiry` fires once, after
    /// [`RECONNECT_WINDOW_SECS`], unless `cancel`/`complete` is called first. `on_notify`, if
    /// given, fires once after [`DISCONNECT_NOTIFY_GRACE_SECS`] (used to avoid flashing a
    /// disconnect overlay on a transient blip).
    pub async fn register_disconnection(
        &self,
        player_id: Uuid,
        lobby_id: String,
        on_expiry: impl Fn() + Send + Sync + 'static,
        on_notify: Option<impl Fn() + Send + Sync + 'static>,
    ) {
        let record = ReconnectRecord {
            lobby_id,
            disconnected_at: Utc::now(),
        };
        let expiry_handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(RECONNECT_WINDOW_SECS)).await;
            on_expiry();
        });
        let notify_handle = on_notify.map(|cb| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(DISCONNECT_NOTIFY_GRACE_SECS)).await;
                cb();
            })
        });
        let mut entries = self.entries.write().await;
        if let Some(prev) = entries.remove(&player_id) {
            prev.expiry_handle.abort();
            if let Some(h) = prev.notify_handle {
                h.abort();
            }
        }
        entries.insert(
            player_id,
            Entry {
                record,
                expiry_handle,
                notify_handle,
            },
        );
    }

    /// Validates that `player_id` has a pending reconnect entry for `lobby_id`.
    pub async fn validate(&self, player_id: Uuid, lobby_id: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(&player_id)
            .is_some_and(|e| e.record.lobby_id == lobby_id)
    }

    pub async fn has_pending(&self, player_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&player_id)
    }

    pub async fn get(&self, player_id: Uuid) -> Option<ReconnectRecord> {
        self.entries.read().await.get(&player_id).map(|e| e.record.clone())
    }

    /// Clears the entry for `player_id`, cancelling its timers. Called on successful
    /// reconnection or on voluntary leave.
    pub async fn complete(&self, player_id: Uuid) {
        if let Some(entry) = self.entries.write().await.remove(&player_id) {
            entry.expiry_handle.abort();
            if let Some(h) = entry.notify_handle {
                h.abort();
            }
        }
    }

    /// Clears every entry belonging to `lobby_id`, used on lobby cleanup.
    pub async fn clear_lobby(&self, lobby_id: &str) {
        let mut entries = self.entries.write().await;
        let to_remove: Vec<Uuid> = entries
            .iter()
            .filter(|(_, e)| e.record.lobby_id == lobby_id)
            .map(|(id, _)| *id)
            .collect();
        for id in to_remove {
            if let Some(entry) = entries.remove(&id) {
                entry.expiry_handle.abort();
                if let Some(h) = entry.notify_handle {
                    h.abort();
                }
            }
        }
    }
}

pub type SharedReconnectTracker = Arc<ReconnectTracker>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn validate_rejects_unknown_player() {
        let tracker = ReconnectTracker::new();
        assert!(!tracker.validate(Uuid::new_v4(), "ABC123").await);
    }

    #[tokio::test]
    async fn register_then_validate_then_complete() {
        let tracker = ReconnectTracker::new();
        let player_id = Uuid::new_v4();
        tracker
            .register_disconnection(
                player_id,
                "ABC123".into(),
                || {},
                None::<fn()>,
            )
            .await;
        assert!(tracker.validate(player_id, "ABC123").await);
        assert!(!tracker.validate(player_id, "OTHER1").await);
        tracker.complete(player_id).await;
        assert!(!tracker.has_pending(player_id).await);
    }

    #[tokio::test]
    async fn expiry_callback_fires_after_window() {
        let tracker = ReconnectTracker::new();
        let player_id = Uuid::new_v4();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();
        // use a short-circuited test by completing before expiry instead of sleeping 120s
        tracker
            .register_disconnection(
                player_id,
                "ABC123".into(),
                move || fired_clone.store(true, Ordering::SeqCst),
                None::<fn()>,
            )
            .await;
        tracker.complete(player_id).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
