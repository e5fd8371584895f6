// dtale-desktop HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, status handling, and
// timeout classification. Endpoint modules (settings, sources, nodes)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the dtale-desktop server.
///
/// Every method returns the response body already decoded into the
/// server's action vocabulary. Non-success statuses surface as
/// [`Error::Http`] with a `"{reason}: {detail}"` message.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            client_id: transport.client_id.clone(),
            timeout: transport.timeout,
        })
    }

    /// The session client id sent with every request.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Default per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server path, e.g. `source/list/`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the body text.
    pub(crate) async fn get(&self, url: Url, timeout: Option<Duration>) -> Result<String, Error> {
        debug!(%url, "GET");

        let mut request = self.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        self.read_body(resp, timeout).await
    }

    /// Send a POST request with a JSON body and return the body text.
    pub(crate) async fn post(&self, url: Url, body: &impl Serialize) -> Result<String, Error> {
        debug!(%url, "POST");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e, None))?;

        self.read_body(resp, None).await
    }

    /// Read the body of a response, turning non-success statuses into
    /// [`Error::Http`].
    async fn read_body(
        &self,
        resp: reqwest::Response,
        timeout: Option<Duration>,
    ) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(e, timeout))?;

        if status.is_success() {
            return Ok(body);
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let detail = error_detail(&body);
        Err(Error::Http {
            status: status.as_u16(),
            message: format!("{reason}: {detail}"),
        })
    }

    fn classify(&self, err: reqwest::Error, timeout: Option<Duration>) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: timeout.unwrap_or(self.timeout).as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Make sure relative joins land below the base path.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Pull `detail` out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(body) {
        Ok(Detail {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) => body.trim().to_owned(),
    }
}
