// Source endpoints
//
// Catalog listing, per-source node pagination, create/update of the
// source definition, and batched layout saves.

use tracing::debug;

use crate::client::ApiClient;
use crate::decode::decode_actions;
use crate::error::Error;
use crate::models::{ApiAction, ApiLayoutChange, ApiSource};

fn update_source(source: ApiSource) -> Vec<ApiAction> {
    vec![ApiAction::UpdateSource { source }]
}

impl ApiClient {
    /// List every configured source.
    ///
    /// `GET /source/list/`
    pub async fn list_sources(&self) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url("source/list/")?;
        debug!("listing sources");
        let body = self.get(url, None).await?;
        decode_actions(&body, |sources: Vec<ApiSource>| {
            vec![ApiAction::AddSources { sources }]
        })
    }

    /// Load the next page of a source's nodes. The server tracks the cursor.
    ///
    /// `GET /source/{id}/load-nodes/?limit=N`
    pub async fn load_source_nodes(
        &self,
        source_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ApiAction>, Error> {
        let mut url = self.api_url(&format!("source/{source_id}/load-nodes/"))?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        debug!(source_id, ?limit, "loading source nodes");
        let body = self.get(url, None).await?;
        decode_actions(&body, update_source)
    }

    /// Create a new source. The body never includes nodes.
    ///
    /// `POST /source/create/`
    pub async fn create_source(&self, source: &ApiSource) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url("source/create/")?;
        debug!(name = %source.name, "creating source");
        let body = self.post(url, source).await?;
        decode_actions(&body, |source: ApiSource| {
            vec![ApiAction::AddSources {
                sources: vec![source],
            }]
        })
    }

    /// Overwrite an existing source's definition.
    ///
    /// `POST /source/update/`
    pub async fn update_source(&self, source: &ApiSource) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url("source/update/")?;
        debug!(source_id = %source.id, "updating source");
        let body = self.post(url, source).await?;
        decode_actions(&body, update_source)
    }

    /// Save visibility and ordering for a batch of sources.
    ///
    /// `POST /source/update-layout/`
    pub async fn update_layout(
        &self,
        changes: &[ApiLayoutChange],
    ) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url("source/update-layout/")?;
        debug!(changes = changes.len(), "saving layout");
        let body = self.post(url, &changes).await?;
        decode_actions(&body, |sources: Vec<ApiSource>| {
            sources.into_iter().flat_map(update_source).collect()
        })
    }
}
