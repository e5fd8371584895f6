// ── Core error types ──
//
// Errors surfaced by dtdesk-core. Raw transport details are folded into
// a small set of domain variants by `From<dtdesk_api::Error>`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to dtale-desktop at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Push channel disconnected")]
    Disconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server refused the request (4xx). `message` is `"{reason}: {detail}"`.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text handed to request error handlers and stored in `RootState::error`.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dtdesk_api::Error> for CoreError {
    fn from(err: dtdesk_api::Error) -> Self {
        use dtdesk_api::Error as Api;

        match err {
            Api::Http { status: 404, message } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: message,
            },
            Api::Http { status, message } if (400..500).contains(&status) => {
                CoreError::Rejected { message }
            }
            Api::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            Api::InvalidClientId(id) => CoreError::Config {
                message: format!("invalid client id: {id}"),
            },
            Api::Deserialization { message, body } => {
                tracing::debug!(body = %body, "undecodable response body");
                CoreError::Internal(format!("unexpected response: {message}"))
            }
            Api::PushConnect(reason) => CoreError::ConnectionFailed {
                url: "push channel".into(),
                reason,
            },
            Api::PushClosed { .. } => CoreError::Disconnected,
        }
    }
}
