//! Live session reconciliation
//!
//! One authoritative, insertion-ordered map of currently active charging
//! sessions, fed by decoded feed events and shared read-only by every
//! screen that projects from it. One instance serves all views through
//! change notifications instead of each screen keeping its own map.

use crate::event::{SessionEvent, SessionKey, SessionStatus};
use crate::logging::get_logger;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// A reconciled live session: the latest event plus bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    /// Latest event observed for this key
    pub event: SessionEvent,

    /// When this key was first observed. The feed carries no start time,
    /// so this approximates it and understates the true duration.
    pub first_seen: DateTime<Utc>,
}

/// Change emitted by one `apply` call.
///
/// `Completed` carries the last stored snapshot (with status flipped), not
/// the completion frame's own fields, so a toast can still show the
/// vehicle, plate and rate after the entry is gone.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeNotification {
    /// A new key entered the live set
    Started(ActiveSession),
    /// An existing key was overwritten in place (e.g. rate update)
    Updated(ActiveSession),
    /// A key left the live set
    Completed(ActiveSession),
}

impl ChangeNotification {
    /// The session this notification refers to
    pub fn session(&self) -> &ActiveSession {
        match self {
            Self::Started(s) | Self::Updated(s) | Self::Completed(s) => s,
        }
    }
}

/// Shared handle for one reconciler instance.
///
/// The feed reader task is the only writer; views take read locks. A read
/// guard observes a consistent point-in-time state, never a torn entry.
pub type SharedReconciler = Arc<RwLock<Reconciler>>;

/// Authoritative in-memory set of currently active charging sessions.
///
/// `apply` must be called sequentially (single writer). The map preserves
/// insertion order: overwriting an existing key keeps its position, so
/// carousel and grid UIs stay stable across rate updates.
pub struct Reconciler {
    sessions: IndexMap<SessionKey, ActiveSession>,

    /// Fan-out of change notifications to subscribed views
    changes_tx: broadcast::Sender<ChangeNotification>,

    logger: crate::logging::StructuredLogger,
}

impl Reconciler {
    /// Create a new, empty reconciler
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(256);
        Self {
            sessions: IndexMap::new(),
            changes_tx,
            logger: get_logger("reconciler"),
        }
    }

    /// Wrap in the shared single-writer/multi-reader handle
    pub fn new_shared() -> SharedReconciler {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Subscribe to change notifications.
    ///
    /// Slow subscribers may observe `Lagged` and should resynchronize from
    /// `snapshot`.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotification> {
        self.changes_tx.subscribe()
    }

    /// Apply one decoded feed event to the authoritative state.
    ///
    /// Transitions per key K = (station, vehicle, pump):
    /// - absent, `charging`  -> insert at the end, `Started`
    /// - active, `charging`  -> overwrite in place (position kept), `Updated`
    /// - active, `completed` -> remove, `Completed` with the last snapshot
    /// - absent, `completed` -> no-op (duplicate or out-of-order completion)
    ///
    /// The feed gives no ordering guarantee, so a late `charging` frame can
    /// resurrect a just-completed key; the idempotent removal above bounds
    /// the damage to one stale card until the next completion.
    pub fn apply(&mut self, event: SessionEvent) -> Option<ChangeNotification> {
        let key = event.key();

        let notification = match event.status {
            SessionStatus::Charging => {
                if let Some(existing) = self.sessions.get_mut(&key) {
                    existing.event = event;
                    ChangeNotification::Updated(existing.clone())
                } else {
                    let session = ActiveSession {
                        event,
                        first_seen: Utc::now(),
                    };
                    self.sessions.insert(key, session.clone());
                    self.logger
                        .debug(&format!("session started for key {}", key));
                    ChangeNotification::Started(session)
                }
            }
            SessionStatus::Completed => {
                // shift_remove keeps the relative order of the survivors
                match self.sessions.shift_remove(&key) {
                    Some(mut last) => {
                        last.event.status = SessionStatus::Completed;
                        self.logger.info(&format!(
                            "vehicle {} completed at station {}",
                            last.event.vehicle.plate_number, last.event.station.name
                        ));
                        ChangeNotification::Completed(last)
                    }
                    None => {
                        self.logger.debug(&format!(
                            "completion for unknown key {}, ignoring",
                            key
                        ));
                        return None;
                    }
                }
            }
        };

        let _ = self.changes_tx.send(notification.clone());
        Some(notification)
    }

    /// Latest event per key, in insertion order
    pub fn snapshot(&self) -> Vec<SessionEvent> {
        self.sessions.values().map(|s| s.event.clone()).collect()
    }

    /// Full entries (event plus first-seen time), in insertion order
    pub fn entries(&self) -> Vec<ActiveSession> {
        self.sessions.values().cloned().collect()
    }

    /// Sessions whose vehicle belongs to `owner_id`, in insertion order.
    ///
    /// Filtering is read-time only: the authoritative map keeps every
    /// owner's sessions so other views can project them.
    pub fn snapshot_for_owner(&self, owner_id: i64) -> Vec<SessionEvent> {
        self.sessions
            .values()
            .filter(|s| s.event.owner_id() == Some(owner_id))
            .map(|s| s.event.clone())
            .collect()
    }

    /// Latest event for one key, if active
    pub fn get(&self, key: &SessionKey) -> Option<SessionEvent> {
        self.sessions.get(key).map(|s| s.event.clone())
    }

    /// Full entry for one key, if active
    pub fn get_entry(&self, key: &SessionKey) -> Option<ActiveSession> {
        self.sessions.get(key).cloned()
    }

    /// Number of active sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the live set is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop all entries without emitting per-entry notifications.
    ///
    /// Used by the disconnect policy; views resynchronize from `snapshot`.
    pub fn clear(&mut self) {
        if !self.sessions.is_empty() {
            self.logger
                .info(&format!("clearing {} live sessions", self.sessions.len()));
            self.sessions.clear();
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}
