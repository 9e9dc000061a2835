//! # Argus - Live Charging Session Monitor
//!
//! Client-side core for monitoring an EV charging reservation network:
//! one WebSocket connection to the charging feed, decoded into typed
//! session events, reconciled into a single authoritative set of active
//! sessions, and projected read-only for any number of screens, alongside
//! a REST bridge for paginated session history.
//!
//! ## Architecture
//!
//! The pipeline writes in one direction; views only read:
//!
//! - `feed`: WebSocket connection lifecycle and the reader task
//! - `event`: wire types and pure frame decoding
//! - `reconciler`: authoritative active-session map with change broadcast
//! - `projector`: chunking, aggregates, and history-row mapping
//! - `history`: paginated completed-session bridge
//! - `api`: typed client for the reservation REST API
//! - `config`: YAML configuration with validation
//! - `logging`: structured logging and tracing
//!
//! Decode failures and transport drops are recovered locally with logged
//! diagnostics; only REST call failures propagate to callers.

pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod history;
pub mod logging;
pub mod projector;
pub mod reconciler;

// Re-export commonly used types
pub use config::Config;
pub use error::{ArgusError, DecodeError, Result};
pub use event::{SessionEvent, SessionKey, SessionStatus};
pub use feed::{ConnectionState, FeedClient};
pub use reconciler::{ChangeNotification, Reconciler, SharedReconciler};
