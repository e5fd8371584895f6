// Shared transport configuration for building reqwest::Client instances.
//
// Every request to the server carries the same JSON content type and
// the per-session `Client-Id` header, so both are baked into the
// client's default headers here.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

/// Header the server uses to exclude a client from its own push echoes.
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Default per-request timeout.
    pub timeout: Duration,
    /// Per-session identity token sent with every request.
    pub client_id: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            client_id: generate_client_id(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client_id = HeaderValue::from_str(&self.client_id)
            .map_err(|e| Error::InvalidClientId(e.to_string()))?;
        headers.insert(HeaderName::from_static(CLIENT_ID_HEADER), client_id);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("dtdesk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}

/// Generate the per-session client token.
///
/// The server parses the header as an integer, so the token is the
/// current unix time in milliseconds.
pub fn generate_client_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_numeric() {
        let id = generate_client_id();
        assert!(id.parse::<i64>().is_ok(), "expected integer token, got {id}");
    }

    #[test]
    fn rejects_unprintable_client_id() {
        let config = TransportConfig {
            client_id: "bad\nid".into(),
            ..TransportConfig::default()
        };
        assert!(config.build_client().is_err());
    }
}
