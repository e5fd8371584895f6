// ── Request gateway ──
//
// Every server call flows through `RequestGateway::submit`. The gateway
// brackets the call with busy flags, converts the response into actions,
// dispatches them in order, and routes failures to an error handler.
// One attempt per call, no retries.

use std::fmt;
use std::sync::Arc;

use dtdesk_api::{ApiAction, ApiClient, ApiLayoutChange, ApiSource};
use tracing::debug;
use url::Url;

use crate::action::Action;
use crate::convert::into_actions;
use crate::error::CoreError;
use crate::layout::LayoutChange;
use crate::model::{Source, ViewPage};
use crate::store::Store;

/// Receives the message of a failed request.
pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// One remote operation.
#[derive(Debug, Clone)]
pub enum Request {
    LoadSettings,
    LoadCatalog,
    LoadNodes {
        source_id: String,
        limit: Option<u32>,
    },
    ViewNode {
        data_id: String,
    },
    KillNode {
        data_id: String,
    },
    ClearNodeCache {
        data_id: String,
    },
    CreateSource(Arc<Source>),
    UpdateSource(Arc<Source>),
    UpdateLayout(Vec<LayoutChange>),
    WatchProfileReport {
        data_id: String,
    },
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Self::LoadSettings => "load_settings",
            Self::LoadCatalog => "load_catalog",
            Self::LoadNodes { .. } => "load_nodes",
            Self::ViewNode { .. } => "view_node",
            Self::KillNode { .. } => "kill_node",
            Self::ClearNodeCache { .. } => "clear_node_cache",
            Self::CreateSource(_) => "create_source",
            Self::UpdateSource(_) => "update_source",
            Self::UpdateLayout(_) => "update_layout",
            Self::WatchProfileReport { .. } => "watch_profile_report",
        }
    }
}

/// Entity whose busy flag brackets a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusyTarget {
    /// The catalog load marker.
    Catalog,
    Source(String),
    Node(String),
}

impl BusyTarget {
    fn action(&self, busy: bool) -> Action {
        match self {
            Self::Catalog => Action::SetSourcesLoading(busy),
            Self::Source(id) => Action::SetSourceUpdating {
                id: id.clone(),
                updating: busy,
            },
            Self::Node(data_id) => Action::SetNodeUpdating {
                data_id: data_id.clone(),
                updating: busy,
            },
        }
    }
}

/// Per-call knobs for [`RequestGateway::submit`].
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub busy: Option<BusyTarget>,
    /// Replaces the default handler (log + `SetError`).
    pub on_error: Option<ErrorHandler>,
    /// Dispatched after the response actions on success.
    pub after_resolve: Vec<Action>,
}

impl RequestOptions {
    pub fn busy(target: BusyTarget) -> Self {
        Self {
            busy: Some(target),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on_error(mut self, handler: Option<ErrorHandler>) -> Self {
        self.on_error = handler;
        self
    }

    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.after_resolve.push(action);
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("busy", &self.busy)
            .field("on_error", &self.on_error.is_some())
            .field("after_resolve", &self.after_resolve)
            .finish()
    }
}

// ── Busy bracket ─────────────────────────────────────────────────────

/// Sets the busy flag on open and clears it on drop, so the flag is
/// released on every exit path including cancellation of the future.
struct BusyBracket<'a> {
    store: &'a Store,
    target: Option<BusyTarget>,
}

impl<'a> BusyBracket<'a> {
    fn open(store: &'a Store, target: Option<BusyTarget>) -> Self {
        if let Some(target) = &target {
            store.dispatch(target.action(true));
        }
        Self { store, target }
    }
}

impl Drop for BusyBracket<'_> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            self.store.dispatch(target.action(false));
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────────

/// Sends requests and feeds their results into the store.
#[derive(Clone)]
pub struct RequestGateway {
    client: ApiClient,
    store: Arc<Store>,
}

impl RequestGateway {
    pub fn new(client: ApiClient, store: Arc<Store>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Send one request and apply its result.
    ///
    /// Returns the actions dispatched from the response, in order. On
    /// failure the message goes to `options.on_error`, or to the default
    /// handler, and the error is returned as well.
    pub async fn submit(
        &self,
        request: Request,
        options: RequestOptions,
    ) -> Result<Vec<Action>, CoreError> {
        let name = request.name();
        let RequestOptions {
            busy,
            on_error,
            after_resolve,
        } = options;

        let bracket = BusyBracket::open(&self.store, busy);
        let result = self.send(request).await;

        match result {
            Ok(raw) => {
                let actions = into_actions(raw);
                debug!(request = name, actions = actions.len(), "request resolved");
                self.store.dispatch_all(actions.iter().cloned());
                drop(bracket);
                self.store.dispatch_all(after_resolve);
                Ok(actions)
            }
            Err(err) => {
                let err = CoreError::from(err);
                drop(bracket);
                self.report(name, &err, on_error.as_ref());
                Err(err)
            }
        }
    }

    fn report(&self, name: &str, err: &CoreError, handler: Option<&ErrorHandler>) {
        let message = err.user_message();
        match handler {
            Some(handler) => handler(&message),
            None => {
                debug!(request = name, error = %message, "request failed");
                self.store.dispatch(Action::SetError(Some(message)));
            }
        }
    }

    async fn send(&self, request: Request) -> Result<Vec<ApiAction>, dtdesk_api::Error> {
        let client = &self.client;
        match request {
            Request::LoadSettings => client.get_settings().await,
            Request::LoadCatalog => client.list_sources().await,
            Request::LoadNodes { source_id, limit } => {
                client.load_source_nodes(&source_id, limit).await
            }
            Request::ViewNode { data_id } => client.view_node(&data_id).await,
            Request::KillNode { data_id } => client.kill_node(&data_id).await,
            Request::ClearNodeCache { data_id } => client.clear_node_cache(&data_id).await,
            Request::CreateSource(source) => {
                client.create_source(&ApiSource::from(source.as_ref())).await
            }
            Request::UpdateSource(source) => {
                client.update_source(&ApiSource::from(source.as_ref())).await
            }
            Request::UpdateLayout(changes) => {
                let body: Vec<ApiLayoutChange> = changes.iter().map(Into::into).collect();
                client.update_layout(&body).await
            }
            Request::WatchProfileReport { data_id } => client.watch_profile_report(&data_id).await,
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    pub async fn load_settings(&self) -> Result<(), CoreError> {
        self.submit(Request::LoadSettings, RequestOptions::default())
            .await
            .map(drop)
    }

    pub async fn load_catalog(&self) -> Result<(), CoreError> {
        self.submit(Request::LoadCatalog, RequestOptions::busy(BusyTarget::Catalog))
            .await
            .map(drop)
    }

    /// Request the next page of a source's nodes. The server tracks the cursor.
    pub async fn load_nodes(&self, source_id: &str, limit: Option<u32>) -> Result<(), CoreError> {
        self.submit(
            Request::LoadNodes {
                source_id: source_id.to_owned(),
                limit,
            },
            RequestOptions::busy(BusyTarget::Source(source_id.to_owned())),
        )
        .await
        .map(drop)
    }

    /// Start (or reuse) the node's viewer and return the URL for `page`.
    pub async fn view_node(&self, data_id: &str, page: ViewPage) -> Result<Option<String>, CoreError> {
        let actions = self
            .submit(
                Request::ViewNode {
                    data_id: data_id.to_owned(),
                },
                RequestOptions::busy(BusyTarget::Node(data_id.to_owned())),
            )
            .await?;

        Ok(actions.iter().rev().find_map(|action| match action {
            Action::UpdateNode(node) if node.data_id == data_id => {
                node.url_for(page).map(str::to_owned)
            }
            _ => None,
        }))
    }

    pub async fn kill_node(&self, data_id: &str) -> Result<(), CoreError> {
        self.submit(
            Request::KillNode {
                data_id: data_id.to_owned(),
            },
            RequestOptions::busy(BusyTarget::Node(data_id.to_owned())),
        )
        .await
        .map(drop)
    }

    pub async fn clear_node_cache(&self, data_id: &str) -> Result<(), CoreError> {
        self.submit(
            Request::ClearNodeCache {
                data_id: data_id.to_owned(),
            },
            RequestOptions::busy(BusyTarget::Node(data_id.to_owned())),
        )
        .await
        .map(drop)
    }

    /// Create a source from a draft. Closes the editor on success.
    ///
    /// Drafts missing a name or either script are rejected locally.
    pub async fn create_source(
        &self,
        draft: Source,
        on_error: Option<ErrorHandler>,
    ) -> Result<(), CoreError> {
        draft.validate_draft()?;
        self.submit(
            Request::CreateSource(Arc::new(draft)),
            RequestOptions::default()
                .on_error(on_error)
                .then(Action::SetSelectedSource(None)),
        )
        .await
        .map(drop)
    }

    /// Save a source's metadata and scripts. Closes the editor on success.
    pub async fn update_source(
        &self,
        draft: Source,
        on_error: Option<ErrorHandler>,
    ) -> Result<(), CoreError> {
        draft.validate_draft()?;
        self.submit(
            Request::UpdateSource(Arc::new(draft)),
            RequestOptions::default()
                .on_error(on_error)
                .then(Action::SetSelectedSource(None)),
        )
        .await
        .map(drop)
    }

    /// Save layout changes. Returns `false` without a request when there
    /// is nothing to send. Closes the modal on success.
    pub async fn update_layout(&self, changes: Vec<LayoutChange>) -> Result<bool, CoreError> {
        if changes.is_empty() {
            debug!("layout unchanged, nothing to save");
            return Ok(false);
        }
        self.submit(
            Request::UpdateLayout(changes),
            RequestOptions::default().then(Action::SetOpenModal(None)),
        )
        .await?;
        Ok(true)
    }

    /// Open a profile report through `opener`, then wait for the server
    /// to finish building it.
    pub async fn open_profile_report<F>(&self, data_id: &str, opener: F) -> Result<(), CoreError>
    where
        F: FnOnce(Url),
    {
        let url = self.client.profile_report_url(data_id)?;
        opener(url);
        self.submit(
            Request::WatchProfileReport {
                data_id: data_id.to_owned(),
            },
            RequestOptions::default(),
        )
        .await
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_clears_on_drop() {
        let store = Store::new();
        store.dispatch(Action::Unknown);
        let mut rx = store.applied();

        {
            let _bracket = BusyBracket::open(&store, Some(BusyTarget::Node("a".into())));
        }

        let opened = rx.try_recv().ok();
        let closed = rx.try_recv().ok();
        assert_eq!(
            opened,
            Some(Action::SetNodeUpdating {
                data_id: "a".into(),
                updating: true
            })
        );
        assert_eq!(
            closed,
            Some(Action::SetNodeUpdating {
                data_id: "a".into(),
                updating: false
            })
        );
    }

    #[test]
    fn catalog_target_uses_loading_marker() {
        assert_eq!(BusyTarget::Catalog.action(true), Action::SetSourcesLoading(true));
    }
}
