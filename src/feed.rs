//! Charging feed connection management
//!
//! Owns one WebSocket connection to the charging feed: connect, greet,
//! read, reconcile, and tear down. The reader task is the single writer
//! of the shared reconciler; every other consumer is read-only.

use crate::config::{FeedConfig, ReconnectPolicy};
use crate::error::{ArgusError, Result};
use crate::event::decode;
use crate::logging::get_logger;
use crate::reconciler::SharedReconciler;
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Text frame sent to the feed right after the connection opens
const GREETING: &str = "Hello from client!";

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Lifecycle of the feed connection, shown as the status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Error => "Error",
        };
        write!(f, "{}", label)
    }
}

/// How one read pass over the socket ended
enum ReadOutcome {
    /// Remote close frame or end of stream
    Closed,
    /// Transport-level failure
    Errored,
}

/// Client for the charging feed WebSocket.
///
/// `connect` is idempotent and `disconnect` is safe to call repeatedly.
/// After `disconnect` returns, no further event reaches the reconciler:
/// the reader task is aborted and awaited before the call completes.
pub struct FeedClient {
    config: FeedConfig,
    reconciler: SharedReconciler,
    status_tx: watch::Sender<ConnectionState>,
    status_rx: watch::Receiver<ConnectionState>,
    reader: Option<JoinHandle<()>>,
    logger: crate::logging::StructuredLogger,
}

impl FeedClient {
    /// Create a new client writing into `reconciler`
    pub fn new(config: FeedConfig, reconciler: SharedReconciler) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            reconciler,
            status_tx,
            status_rx,
            reader: None,
            logger: get_logger("feed"),
        }
    }

    /// Current connection state
    pub fn status(&self) -> ConnectionState {
        *self.status_rx.borrow()
    }

    /// Watch connection state transitions (for status badges)
    pub fn watch_status(&self) -> watch::Receiver<ConnectionState> {
        self.status_rx.clone()
    }

    /// Connect to the configured feed URL.
    ///
    /// A no-op while already connected. On success the greeting frame has
    /// been sent and the reader task is running.
    pub async fn connect(&mut self) -> Result<()> {
        if self.status() == ConnectionState::Connected
            && self.reader.as_ref().is_some_and(|h| !h.is_finished())
        {
            return Ok(());
        }

        // Drop any finished or stale reader before dialing again
        if let Some(handle) = self.reader.take() {
            handle.abort();
            let _ = handle.await;
        }

        let _ = self.status_tx.send(ConnectionState::Connecting);
        self.logger
            .info(&format!("connecting to charging feed at {}", self.config.url));

        let (mut stream, _) = match connect_async(self.config.url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => {
                let _ = self.status_tx.send(ConnectionState::Error);
                return Err(ArgusError::transport(format!(
                    "failed to connect to charging feed: {}",
                    e
                )));
            }
        };

        if let Err(e) = stream.send(Message::Text(GREETING.into())).await {
            let _ = self.status_tx.send(ConnectionState::Error);
            return Err(ArgusError::transport(format!(
                "failed to send greeting: {}",
                e
            )));
        }

        let _ = self.status_tx.send(ConnectionState::Connected);
        self.logger.info("connected to charging feed");

        self.reader = Some(tokio::spawn(read_loop(
            stream,
            self.reconciler.clone(),
            self.status_tx.clone(),
            self.config.clone(),
            self.logger.clone(),
        )));

        Ok(())
    }

    /// Close the connection.
    ///
    /// Tears down the reader task before returning, so no event is applied
    /// to the reconciler afterwards. Safe when already disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
            let _ = handle.await;
            self.logger.info("disconnected from charging feed");
        }
        let _ = self.status_tx.send(ConnectionState::Disconnected);
    }
}

impl Drop for FeedClient {
    fn drop(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
        }
    }
}

/// Read frames until the connection dies; reconnect if policy allows.
async fn read_loop(
    stream: WsStream,
    reconciler: SharedReconciler,
    status_tx: watch::Sender<ConnectionState>,
    config: FeedConfig,
    logger: crate::logging::StructuredLogger,
) {
    let mut stream = stream;
    loop {
        match read_frames(&mut stream, &reconciler, &logger).await {
            ReadOutcome::Closed => {
                logger.info("charging feed connection closed");
                let _ = status_tx.send(ConnectionState::Disconnected);
            }
            ReadOutcome::Errored => {
                let _ = status_tx.send(ConnectionState::Error);
            }
        }

        if config.clear_on_disconnect {
            let mut rec = reconciler.write().unwrap_or_else(|p| p.into_inner());
            rec.clear();
        }

        if !config.reconnect.enabled {
            return;
        }

        match reconnect_with_backoff(&config.url, &config.reconnect, &status_tx, &logger).await {
            Some(new_stream) => stream = new_stream,
            None => {
                let _ = status_tx.send(ConnectionState::Disconnected);
                return;
            }
        }
    }
}

/// Forward frames into the reconciler until the transport gives out
async fn read_frames(
    stream: &mut WsStream,
    reconciler: &SharedReconciler,
    logger: &crate::logging::StructuredLogger,
) -> ReadOutcome {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => apply_frame(text.as_str(), reconciler, logger),
            Ok(Message::Close(_)) => return ReadOutcome::Closed,
            Ok(_) => {} // Binary/Ping/Pong are ignored
            Err(e) => {
                logger.error(&format!("charging feed transport error: {}", e));
                return ReadOutcome::Errored;
            }
        }
    }
    ReadOutcome::Closed
}

/// Decode one frame and apply it; decode failures are logged and dropped
fn apply_frame(
    raw: &str,
    reconciler: &SharedReconciler,
    logger: &crate::logging::StructuredLogger,
) {
    match decode(raw) {
        Ok(event) => {
            let mut rec = reconciler.write().unwrap_or_else(|p| p.into_inner());
            rec.apply(event);
        }
        Err(e) => {
            logger.warn(&format!("bad frame from server: {}", e));
        }
    }
}

/// Dial the feed again with exponential backoff and jitter.
///
/// Returns the fresh stream with the greeting already sent, or `None`
/// once `max_attempts` is exhausted.
async fn reconnect_with_backoff(
    url: &str,
    policy: &ReconnectPolicy,
    status_tx: &watch::Sender<ConnectionState>,
    logger: &crate::logging::StructuredLogger,
) -> Option<WsStream> {
    let mut attempt: u32 = 0;
    let mut delay = policy.initial_delay_ms.max(1);

    loop {
        attempt += 1;
        if policy.max_attempts > 0 && attempt > policy.max_attempts {
            logger.warn(&format!(
                "giving up on charging feed after {} reconnect attempts",
                policy.max_attempts
            ));
            return None;
        }

        tokio::time::sleep(Duration::from_millis(delay + jitter_ms(policy.jitter_ms))).await;

        let _ = status_tx.send(ConnectionState::Connecting);
        logger.info(&format!("reconnect attempt {} to {}", attempt, url));

        match connect_async(url).await {
            Ok((mut stream, _)) => {
                if let Err(e) = stream.send(Message::Text(GREETING.into())).await {
                    logger.warn(&format!("greeting failed after reconnect: {}", e));
                    let _ = status_tx.send(ConnectionState::Error);
                } else {
                    let _ = status_tx.send(ConnectionState::Connected);
                    logger.info("charging feed reconnected");
                    return Some(stream);
                }
            }
            Err(e) => {
                logger.warn(&format!("reconnect attempt {} failed: {}", attempt, e));
                let _ = status_tx.send(ConnectionState::Error);
            }
        }

        delay = delay.saturating_mul(2).min(policy.max_delay_ms.max(1));
    }
}

/// Cheap jitter without a PRNG dependency: sub-second clock noise
fn jitter_ms(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    nanos % bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::Reconciler;

    #[test]
    fn test_state_badge_labels() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting...");
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
        assert_eq!(ConnectionState::Error.to_string(), "Error");
    }

    #[test]
    fn test_jitter_bounds() {
        assert_eq!(jitter_ms(0), 0);
        for _ in 0..100 {
            assert!(jitter_ms(250) < 250);
        }
    }

    #[test]
    fn test_new_client_starts_disconnected() {
        let client = FeedClient::new(FeedConfig::default(), Reconciler::new_shared());
        assert_eq!(client.status(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_safe() {
        let mut client = FeedClient::new(FeedConfig::default(), Reconciler::new_shared());
        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.status(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_bad_frame_leaves_state_unchanged() {
        let reconciler = Reconciler::new_shared();
        let logger = get_logger("feed");

        apply_frame("not json at all", &reconciler, &logger);
        apply_frame(r#"{"pump": 1}"#, &reconciler, &logger);

        let rec = reconciler.read().unwrap_or_else(|p| p.into_inner());
        assert!(rec.is_empty());
    }
}
