// ── API-to-domain type conversions ──
//
// Bridges raw `dtdesk_api` wire types into `dtdesk_core::model` and back.
// Inbound conversions fill defaults for omitted fields. Outbound ones
// build request bodies and never carry the node collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dtdesk_api::{ApiAction, ApiLayoutChange, ApiNode, ApiSettings, ApiSource};
use tracing::warn;

use crate::action::Action;
use crate::layout::LayoutChange;
use crate::model::{Modal, Node, Settings, Source, SourceCode, ViewUrls};

// ── Helpers ────────────────────────────────────────────────────────

/// Convert an optional epoch-milliseconds timestamp to `DateTime<Utc>`.
fn millis_to_datetime(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

/// Parse a modal name, dropping names this client cannot show.
fn parse_modal(raw: Option<String>) -> Option<Modal> {
    let raw = raw?;
    match raw.parse() {
        Ok(modal) => Some(modal),
        Err(_) => {
            warn!(modal = %raw, "unknown modal name, closing modal");
            None
        }
    }
}

// ── Node ───────────────────────────────────────────────────────────

impl From<ApiNode> for Node {
    fn from(n: ApiNode) -> Self {
        Self {
            data_id: n.data_id,
            source_id: n.source_id,
            path: n.path,
            urls: ViewUrls {
                table: n.dtale_url,
                charts: n.dtale_charts_url,
                describe: n.dtale_describe_url,
                correlations: n.dtale_correlations_url,
            },
            visible: n.visible,
            last_cached_at: millis_to_datetime(n.last_cached_at),
            error: n.error,
            updating: false,
            sort_value: n.sort_value,
        }
    }
}

// ── Source ─────────────────────────────────────────────────────────

impl From<ApiSource> for Source {
    fn from(s: ApiSource) -> Self {
        let nodes = s
            .nodes
            .into_iter()
            .map(|(key, node)| (key, Arc::new(Node::from(node))))
            .collect();

        Self {
            id: s.id,
            name: s.name,
            package_name: s.package_name,
            package_path: s.package_path,
            editable: s.editable,
            visible: s.visible,
            sort_value: s.sort_value,
            nodes,
            nodes_fully_loaded: s.nodes_fully_loaded,
            error: s.error,
            updating: false,
            code: SourceCode {
                list_paths: s.list_paths,
                get_data: s.get_data,
                save_data: s.save_data,
            },
        }
    }
}

/// Request body for create/update. Nodes are not sent.
impl From<&Source> for ApiSource {
    fn from(s: &Source) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            package_name: s.package_name.clone(),
            package_path: s.package_path.clone(),
            nodes: indexmap::IndexMap::new(),
            nodes_fully_loaded: s.nodes_fully_loaded,
            error: None,
            visible: s.visible,
            editable: s.editable,
            sort_value: s.sort_value,
            list_paths: s.code.list_paths.clone(),
            get_data: s.code.get_data.clone(),
            save_data: s.code.save_data.clone(),
        }
    }
}

// ── Settings ───────────────────────────────────────────────────────

impl From<ApiSettings> for Settings {
    fn from(s: ApiSettings) -> Self {
        Self {
            disable_add_sources: s.disable_add_data_sources,
            disable_edit_sources: s.disable_edit_data_sources,
            disable_edit_layout: s.disable_edit_layout,
            disable_profile_reports: s.disable_profile_reports,
            enable_push_channel: s.enable_websocket_connections,
            app_title: s.app_title,
            header: s.header,
            extra: s.extra.into_iter().collect(),
        }
    }
}

// ── Layout ─────────────────────────────────────────────────────────

impl From<&LayoutChange> for ApiLayoutChange {
    fn from(c: &LayoutChange) -> Self {
        Self {
            id: c.id.clone(),
            visible: c.visible,
            sort_value: c.sort_value,
        }
    }
}

// ── Actions ────────────────────────────────────────────────────────

impl From<ApiAction> for Action {
    fn from(a: ApiAction) -> Self {
        match a {
            ApiAction::AddSources { sources } => Action::AddSources(
                sources
                    .into_iter()
                    .map(|s| Arc::new(Source::from(s)))
                    .collect(),
            ),
            ApiAction::UpdateSource { source } => Action::UpdateSource(Arc::new(source.into())),
            ApiAction::SetSourceUpdating {
                source_id,
                updating,
            } => Action::SetSourceUpdating {
                id: source_id,
                updating,
            },
            ApiAction::UpdateNode { node } => Action::UpdateNode(Arc::new(node.into())),
            ApiAction::SetNodeUpdating { data_id, updating } => {
                Action::SetNodeUpdating { data_id, updating }
            }
            ApiAction::SetSelectedSource { source } => {
                Action::SetSelectedSource(source.map(|s| Arc::new(s.into())))
            }
            ApiAction::SetOpenModal { open_modal } => Action::SetOpenModal(parse_modal(open_modal)),
            ApiAction::UpdateSettings { settings } => {
                Action::UpdateSettings(Arc::new(settings.into()))
            }
            ApiAction::Unknown => Action::Unknown,
        }
    }
}

/// Convert a decoded response into dispatch order.
pub(crate) fn into_actions(actions: Vec<ApiAction>) -> Vec<Action> {
    actions.into_iter().map(Action::from).collect()
}
