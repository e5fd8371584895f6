// ── Panel facade ──
//
// Session lifecycle for one dtale-desktop server: builds the transport,
// owns the store, loads settings and the catalog, and starts the push
// listener when both sides allow it.

use std::sync::Arc;

use dtdesk_api::transport::generate_client_id;
use dtdesk_api::{ApiClient, TransportConfig, push_url};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::PanelConfig;
use crate::error::CoreError;
use crate::gateway::RequestGateway;
use crate::model::RootState;
use crate::push::PushListener;
use crate::store::{StateStream, Store};

// ── ConnectionState ──────────────────────────────────────────────────

/// Session state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Panel ────────────────────────────────────────────────────────────

/// Main entry point for consumers. Cheap to clone.
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    config: PanelConfig,
    store: Arc<Store>,
    gateway: RequestGateway,
    push: PushListener,
    connection_state: watch::Sender<ConnectionState>,
}

impl Panel {
    /// Build the transport and an empty store. Does not touch the network.
    pub fn new(config: PanelConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            client_id: config.client_id.clone().unwrap_or_else(generate_client_id),
        };
        let client = ApiClient::new(config.url.clone(), &transport)?;
        debug!(client_id = client.client_id(), url = %config.url, "panel created");

        let store = Arc::new(Store::new());
        let gateway = RequestGateway::new(client, Arc::clone(&store));
        let push = PushListener::new(Arc::clone(&store));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(PanelInner {
                config,
                store,
                gateway,
                push,
                connection_state,
            }),
        })
    }

    /// Load settings, then the catalog, then open the push channel if
    /// enabled locally and by the server.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        if let Err(e) = self.load().await {
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        let server_allows = self
            .snapshot()
            .settings
            .as_ref()
            .is_some_and(|s| s.enable_push_channel);
        if self.inner.config.push_enabled && server_allows {
            if let Err(e) = self.start_push().await {
                warn!(error = %e, "push channel unavailable, continuing without it");
            }
        } else {
            debug!(
                local = self.inner.config.push_enabled,
                server = server_allows,
                "push channel disabled"
            );
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to dtale-desktop");
        Ok(())
    }

    async fn load(&self) -> Result<(), CoreError> {
        self.inner.gateway.load_settings().await?;
        self.inner.gateway.load_catalog().await
    }

    async fn start_push(&self) -> Result<(), CoreError> {
        let client = self.inner.gateway.client();
        let url = push_url(client.base_url(), client.client_id())?;
        self.inner
            .push
            .start(url, self.inner.config.reconnect.clone())
            .await
    }

    /// Stop the push listener. The store keeps its last state.
    pub async fn disconnect(&self) {
        self.inner.push.stop().await;
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.inner.gateway
    }

    pub fn push(&self) -> &PushListener {
        &self.inner.push
    }

    pub fn snapshot(&self) -> Arc<RootState> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    pub fn dispatch(&self, action: Action) {
        self.inner.store.dispatch(action);
    }

    pub fn notifications(&self) -> broadcast::Receiver<String> {
        self.inner.push.notifications()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }
}
