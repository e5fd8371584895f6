// Node endpoints
//
// Viewer lifecycle (launch, kill, cache clear) and profile reports.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::client::ApiClient;
use crate::decode::decode_actions;
use crate::error::Error;
use crate::models::{ApiAction, ApiNode, ProfileReportStatus};

/// The server polls for a finished report for up to ten minutes.
pub const PROFILE_REPORT_WATCH_TIMEOUT: Duration = Duration::from_secs(620);

fn update_node(node: ApiNode) -> Vec<ApiAction> {
    vec![ApiAction::UpdateNode { node }]
}

impl ApiClient {
    /// Launch (or reuse) the viewer for a node.
    ///
    /// `GET /node/view/{dataId}/`
    pub async fn view_node(&self, data_id: &str) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url(&format!("node/view/{data_id}/"))?;
        debug!(data_id, "launching viewer");
        let body = self.get(url, None).await?;
        decode_actions(&body, update_node)
    }

    /// Shut down a node's viewer.
    ///
    /// `GET /node/kill/{dataId}/`
    pub async fn kill_node(&self, data_id: &str) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url(&format!("node/kill/{data_id}/"))?;
        debug!(data_id, "killing viewer");
        let body = self.get(url, None).await?;
        decode_actions(&body, update_node)
    }

    /// Drop a node's cached data.
    ///
    /// `GET /node/clear-cache/{dataId}/`
    pub async fn clear_node_cache(&self, data_id: &str) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url(&format!("node/clear-cache/{data_id}/"))?;
        debug!(data_id, "clearing node cache");
        let body = self.get(url, None).await?;
        decode_actions(&body, update_node)
    }

    /// URL of the page that builds and then shows a profile report.
    ///
    /// `GET /node/profile-report/{dataId}/` (opened by the caller, not fetched)
    pub fn profile_report_url(&self, data_id: &str) -> Result<Url, Error> {
        self.api_url(&format!("node/profile-report/{data_id}/"))
    }

    /// Wait for a profile report to finish building.
    ///
    /// `GET /node/watch-profile-report-builder/{dataId}/` with an extended
    /// timeout, since the server holds the request until the report exists.
    pub async fn watch_profile_report(&self, data_id: &str) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url(&format!("node/watch-profile-report-builder/{data_id}/"))?;
        debug!(data_id, "watching profile report builder");
        let body = self
            .get(url, Some(PROFILE_REPORT_WATCH_TIMEOUT))
            .await?;
        decode_actions(&body, |status: ProfileReportStatus| match status {
            ProfileReportStatus {
                ok: true,
                node: Some(node),
            } => update_node(node),
            _ => Vec::new(),
        })
    }
}
