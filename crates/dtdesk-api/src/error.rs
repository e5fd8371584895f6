use thiserror::Error;

/// Top-level error type for the `dtdesk-api` crate.
///
/// Covers transport, HTTP status, decoding, and push-channel failures.
/// `dtdesk-core` maps these into the string messages handed to
/// request error handlers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client id could not be sent as a header value.
    #[error("Invalid client id: {0}")]
    InvalidClientId(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Server responses ────────────────────────────────────────────
    /// Non-success HTTP status. `message` is `"{reason}: {detail}"`.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Push channel ────────────────────────────────────────────────
    /// Push channel connection failed.
    #[error("Push channel connection failed: {0}")]
    PushConnect(String),

    /// Push channel closed by the server.
    #[error("Push channel closed (code {code}): {reason}")]
    PushClosed { code: u16, reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::PushConnect(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_message_verbatim() {
        let err = Error::Http {
            status: 400,
            message: "Bad Request: name is required".into(),
        };
        assert_eq!(err.to_string(), "Bad Request: name is required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_transient());
    }

    #[test]
    fn classification() {
        assert!(Error::Timeout { timeout_secs: 3 }.is_transient());
        assert!(
            Error::Http {
                status: 404,
                message: String::new()
            }
            .is_not_found()
        );
        assert!(
            Error::Http {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
    }
}
