// ── Node domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Viewer pages a running node can serve.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewPage {
    Table,
    Charts,
    Describe,
    Correlations,
}

/// URLs of a running viewer, one per page. All absent while dormant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewUrls {
    pub table: Option<String>,
    pub charts: Option<String>,
    pub describe: Option<String>,
    pub correlations: Option<String>,
}

impl ViewUrls {
    pub fn get(&self, page: ViewPage) -> Option<&str> {
        match page {
            ViewPage::Table => self.table.as_deref(),
            ViewPage::Charts => self.charts.as_deref(),
            ViewPage::Describe => self.describe.as_deref(),
            ViewPage::Correlations => self.correlations.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_none()
            && self.charts.is_none()
            && self.describe.is_none()
            && self.correlations.is_none()
    }
}

/// One data item of a source, optionally backed by a live viewer.
///
/// `data_id` is unique across the whole store. `source_id` is whatever
/// the server reported and is never used to locate the owning source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub data_id: String,
    pub source_id: String,
    pub path: String,
    pub urls: ViewUrls,
    pub visible: bool,
    pub last_cached_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub updating: bool,
    pub sort_value: i64,
}

impl Node {
    /// A node with at least one viewer URL has a live server-side instance.
    pub fn is_active(&self) -> bool {
        !self.urls.is_empty()
    }

    pub fn url_for(&self, page: ViewPage) -> Option<&str> {
        self.urls.get(page)
    }

    /// Copy with only the busy flag changed.
    pub fn with_updating(&self, updating: bool) -> Self {
        Self {
            updating,
            ..self.clone()
        }
    }
}
