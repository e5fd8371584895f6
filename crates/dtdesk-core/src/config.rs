// ── Panel configuration ──
//
// Everything a `Panel` needs to reach one dtale-desktop server. Built by
// dtdesk-config from a profile, or by hand in tests.

use std::time::Duration;

use dtdesk_api::ReconnectConfig;
use url::Url;

/// Connection settings for a single dtale-desktop server.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Server root, e.g. `http://localhost:5000`.
    pub url: Url,
    /// Default request timeout.
    pub timeout: Duration,
    /// Session identity sent as `client-id`. Generated when `None`.
    pub client_id: Option<String>,
    /// Open the push channel when the server allows it.
    pub push_enabled: bool,
    pub reconnect: ReconnectConfig,
    /// Node page size for `load_nodes`. `None` requests everything.
    pub node_page_size: Option<u32>,
}

impl PanelConfig {
    /// Defaults for the given server: 30s timeout, push on, unbounded pages.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(30),
            client_id: None,
            push_enabled: true,
            reconnect: ReconnectConfig::default(),
            node_page_size: None,
        }
    }
}
