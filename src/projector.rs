//! Read-only view projections over the reconciled live set
//!
//! Pure functions only: chunking for carousel-style screens, aggregate
//! stats for the monitoring header, and the one explicit mapping from a
//! live entry to the history-row shape used by session cards.

use crate::api::types::{SessionRecord, Station, User, Vehicle};
use crate::error::{ArgusError, Result};
use crate::event::SessionEvent;
use crate::reconciler::ActiveSession;

/// Split an ordered projection into fixed-size chunks.
///
/// Yields `ceil(len / chunk_size)` chunks preserving relative order; the
/// last chunk may be shorter. Empty input yields zero chunks. A zero
/// `chunk_size` is a contract violation and fails loudly.
pub fn chunk<T: Clone>(items: &[T], chunk_size: usize) -> Result<Vec<Vec<T>>> {
    if chunk_size == 0 {
        return Err(ArgusError::projection("chunk_size must be at least 1"));
    }
    Ok(items.chunks(chunk_size).map(<[T]>::to_vec).collect())
}

/// Aggregates shown in the monitoring header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorStats {
    /// Number of active sessions
    pub active_sessions: usize,

    /// Sum of all charging rates in watts
    pub total_power_watts: f64,
}

impl MonitorStats {
    /// Compute stats over a projection
    pub fn from_events(events: &[SessionEvent]) -> Self {
        Self {
            active_sessions: events.len(),
            total_power_watts: events.iter().map(|e| e.charging_rate).sum(),
        }
    }
}

/// Format a charging rate for display: kilowatts above 1 kW, watts below.
pub fn format_charging_rate(watts: f64) -> String {
    if watts >= 1000.0 {
        format!("{:.1} kW", watts / 1000.0)
    } else {
        format!("{:.0} W", watts)
    }
}

/// Map a live entry to the history-row shape used by session cards.
///
/// Fields the feed does not carry are synthesized: `startTime` is the
/// time of first observation (understates the true duration; the feed
/// has no start time), and the row is always flagged as charging.
pub fn to_history_row(session: &ActiveSession, user: &User) -> SessionRecord {
    let event = &session.event;
    SessionRecord {
        id: event.session_id,
        user: user.clone(),
        vehicle: Vehicle::from(&event.vehicle),
        station: Station::from(&event.station),
        pump_number: event.pump,
        is_completed: false,
        is_reserved: false,
        is_charging: true,
        start_time: session.first_seen,
    }
}
