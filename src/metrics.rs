//! A small counter set exposed as JSON over `/metrics`.
//!
//! Adapted from this codebase's much larger metrics surface: same atomic-counter idiom,
//! far fewer fields, scoped to the lobby/session lifecycle this server actually has.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct ServerMetrics {
    pub lobbies_created: Counter,
    pub lobbies_joined: Counter,
    pub sessions_started: Counter,
    pub sessions_completed: Counter,
    pub disconnects_registered: Counter,
    pub reconnections_completed: Counter,
    pub reconnect_windows_expired: Counter,
    pub lobbies_swept_stale: Counter,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lobbies_created: self.lobbies_created.get(),
            lobbies_joined: self.lobbies_joined.get(),
            sessions_started: self.sessions_started.get(),
            sessions_completed: self.sessions_completed.get(),
            disconnects_registered: self.disconnects_registered.get(),
            reconnections_completed: self.reconnections_completed.get(),
            reconnect_windows_expired: self.reconnect_windows_expired.get(),
            lobbies_swept_stale: self.lobbies_swept_stale.get(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct MetricsSnapshot {
    pub lobbies_created: u64,
    pub lobbies_joined: u64,
    pub sessions_started: u64,
    pub sessions_completed: u64,
    pub disconnects_registered: u64,
    pub reconnections_completed: u64,
    pub reconnect_windows_expired: u64,
    pub lobbies_swept_stale: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let metrics = ServerMetrics::new();
        assert_eq!(metrics.snapshot().lobbies_created, 0);
        metrics.lobbies_created.inc();
        metrics.lobbies_created.inc();
        assert_eq!(metrics.snapshot().lobbies_created, 2);
    }

    #[test]
    fn independent_counters_do_not_interfere() {
        let metrics = ServerMetrics::new();
        metrics.sessions_started.inc();
        metrics.sessions_completed.inc();
        metrics.sessions_completed.inc();
        let snap = metrics.snapshot();
        assert_eq!(snap.sessions_started, 1);
        assert_eq!(snap.sessions_completed, 2);
    }
}
