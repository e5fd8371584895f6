//! Push channel with auto-reconnect.
//!
//! Connects to the server's `/ws/{client_id}/` endpoint and streams
//! parsed [`PushMessage`]s through a [`tokio::sync::broadcast`] channel.
//! Handles reconnection with exponential backoff + jitter automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use dtdesk_api::push::{PushHandle, ReconnectConfig, push_url};
//! use tokio_util::sync::CancellationToken;
//!
//! let url = push_url(client.base_url(), client.client_id())?;
//! let handle = PushHandle::connect(url, ReconnectConfig::default(), CancellationToken::new())?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(msg) = rx.recv().await {
//!     println!("{msg:?}");
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::PushMessage;

// ── Broadcast channel capacity ───────────────────────────────────────

const MESSAGE_CHANNEL_CAPACITY: usize = 1024;

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for push channel reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── URL ──────────────────────────────────────────────────────────────

/// Build the push channel URL for a server base URL and client id.
///
/// `http://host/` becomes `ws://host/ws/{client_id}/`, `https` maps to `wss`.
pub fn push_url(base_url: &Url, client_id: &str) -> Result<Url, Error> {
    let mut url = base_url.join(&format!("ws/{client_id}/"))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::PushConnect(format!(
                "unsupported scheme for push channel: {other}"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::PushConnect(format!("cannot switch {url} to {scheme}")))?;
    Ok(url)
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push channel subscription.
///
/// Call [`shutdown`](Self::shutdown) to tear down the background task.
pub struct PushHandle {
    message_rx: broadcast::Receiver<Arc<PushMessage>>,
    connected: watch::Receiver<bool>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the reconnection loop for `ws_url`.
    ///
    /// Returns immediately once the background task is spawned. The first
    /// connection attempt happens asynchronously.
    pub fn connect(
        ws_url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(Error::PushConnect(format!(
                "expected a ws:// or wss:// URL, got {ws_url}"
            )));
        }

        let (message_tx, message_rx) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);
        let (connected_tx, connected) = watch::channel(false);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(ws_url, message_tx, connected_tx, reconnect, task_cancel).await;
        });

        Ok(Self {
            message_rx,
            connected,
            cancel,
        })
    }

    /// Get a new broadcast receiver for inbound messages.
    ///
    /// Consumers that fall behind receive
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushMessage>> {
        self.message_rx.resubscribe()
    }

    /// Observe whether a connection is currently open.
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn push_loop(
    ws_url: Url,
    message_tx: broadcast::Sender<Arc<PushMessage>>,
    connected: watch::Sender<bool>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &message_tx, &connected, &cancel) => result,
        };
        connected.send_replace(false);

        match result {
            // Clean close: reconnect immediately.
            Ok(()) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::info!("push channel closed cleanly, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");

                if reconnect.max_retries.is_some_and(|max| attempt >= max) {
                    tracing::error!(
                        max_retries = reconnect.max_retries,
                        "push channel reconnection limit reached, giving up"
                    );
                    break;
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(?delay, attempt, "waiting before reconnect");

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one connection and read frames until it drops.
async fn connect_and_read(
    url: &Url,
    message_tx: &broadcast::Sender<Arc<PushMessage>>,
    connected: &watch::Sender<bool>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(%url, "connecting to push channel");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::PushConnect(e.to_string()))?;

    tracing::info!("push channel connected");
    connected.send_replace(true);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, message_tx);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        return match frame {
                            Some(cf) if cf.code != CloseCode::Normal => {
                                Err(Error::PushClosed {
                                    code: cf.code.into(),
                                    reason: cf.reason.to_string(),
                                })
                            }
                            _ => Ok(()),
                        };
                    }
                    Some(Err(e)) => {
                        return Err(Error::PushConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Binary, Ping, Pong, Frame: tungstenite answers pings itself
                    }
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Parse a text frame and broadcast it. Malformed frames are logged and skipped.
fn parse_and_broadcast(text: &str, message_tx: &broadcast::Sender<Arc<PushMessage>>) {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(msg) => {
            // No subscribers right now is fine
            let _ = message_tx.send(Arc::new(msg));
        }
        Err(e) => {
            tracing::warn!(error = %e, "dropping malformed push message");
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25%, seeded from the attempt number.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{ActionBatch, ApiAction};

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        assert!(d10 <= Duration::from_secs(13), "{d10:?} should be capped near max_delay");
        let huge = calculate_backoff(u32::MAX, &config);
        assert!(huge <= Duration::from_secs(13), "{huge:?} should not overflow");
    }

    #[test]
    fn push_url_maps_scheme() {
        let base = Url::parse("http://localhost:5000/").unwrap();
        assert_eq!(
            push_url(&base, "1700000000000").unwrap().as_str(),
            "ws://localhost:5000/ws/1700000000000/"
        );

        let base = Url::parse("https://desk.example.com/app/").unwrap();
        assert_eq!(
            push_url(&base, "42").unwrap().as_str(),
            "wss://desk.example.com/app/ws/42/"
        );

        let base = Url::parse("ftp://example.com/").unwrap();
        assert!(push_url(&base, "42").is_err());
    }

    #[test]
    fn parse_and_broadcast_notification() {
        let (tx, mut rx) = broadcast::channel(16);
        parse_and_broadcast(r#"{"type":"notification","payload":"report ready"}"#, &tx);
        let msg = rx.try_recv().unwrap();
        assert_eq!(*msg, PushMessage::Notification("report ready".into()));
    }

    #[test]
    fn parse_and_broadcast_single_action() {
        let (tx, mut rx) = broadcast::channel(16);
        parse_and_broadcast(
            r#"{"type":"action","payload":{"type":"SET_NODE_UPDATING","dataId":"a"}}"#,
            &tx,
        );
        let msg = rx.try_recv().unwrap();
        assert_eq!(
            *msg,
            PushMessage::Action(ActionBatch::One(ApiAction::SetNodeUpdating {
                data_id: "a".into(),
                updating: true,
            }))
        );
    }

    #[test]
    fn parse_and_broadcast_malformed_json() {
        let (tx, mut rx) = broadcast::channel::<Arc<PushMessage>>(16);
        parse_and_broadcast("not json at all", &tx);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn connect_rejects_http_url() {
        let url = Url::parse("http://localhost:5000/ws/1/").unwrap();
        let result = PushHandle::connect(url, ReconnectConfig::default(), CancellationToken::new());
        assert!(matches!(result, Err(Error::PushConnect(_))));
    }
}
