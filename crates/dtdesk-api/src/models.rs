// Wire types for the dtale-desktop server.
//
// All payloads are camelCase JSON. Actions are tagged by a `type` field
// in SCREAMING_SNAKE_CASE. Optional fields may be omitted entirely by
// the server, so nearly everything carries a serde default.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ── Entities ─────────────────────────────────────────────────────────

/// One data item of a source, optionally backed by a running viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNode {
    /// Owning source id as reported by the server. Not authoritative.
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub path: String,
    pub data_id: String,
    #[serde(default)]
    pub dtale_url: Option<String>,
    #[serde(default)]
    pub dtale_charts_url: Option<String>,
    #[serde(default)]
    pub dtale_describe_url: Option<String>,
    #[serde(default)]
    pub dtale_correlations_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub sort_value: i64,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    pub last_cached_at: Option<i64>,
}

/// A configured data source.
///
/// `nodes` is never serialized: create and update requests send the
/// source without its node collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSource {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub package_path: String,
    #[serde(default, skip_serializing)]
    pub nodes: IndexMap<String, ApiNode>,
    #[serde(default)]
    pub nodes_fully_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_value: Option<i64>,
    #[serde(default)]
    pub list_paths: String,
    #[serde(default)]
    pub get_data: String,
    #[serde(default)]
    pub save_data: String,
}

/// Server-wide feature toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    #[serde(default)]
    pub disable_add_data_sources: bool,
    #[serde(default)]
    pub disable_edit_data_sources: bool,
    #[serde(default)]
    pub disable_edit_layout: bool,
    #[serde(default)]
    pub disable_profile_reports: bool,
    #[serde(default)]
    pub enable_websocket_connections: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Any toggles this client does not know about yet.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a layout save: `{id, visible, sortValue}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLayoutChange {
    pub id: String,
    pub visible: bool,
    pub sort_value: i64,
}

/// Response of the profile-report watch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileReportStatus {
    pub ok: bool,
    #[serde(default)]
    pub node: Option<ApiNode>,
}

// ── Actions ──────────────────────────────────────────────────────────

/// A state-update action as sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiAction {
    AddSources {
        sources: Vec<ApiSource>,
    },
    UpdateSource {
        source: ApiSource,
    },
    #[serde(rename_all = "camelCase")]
    SetSourceUpdating {
        source_id: String,
        #[serde(default = "default_true")]
        updating: bool,
    },
    UpdateNode {
        node: ApiNode,
    },
    #[serde(rename_all = "camelCase")]
    SetNodeUpdating {
        data_id: String,
        #[serde(default = "default_true")]
        updating: bool,
    },
    SetSelectedSource {
        #[serde(default)]
        source: Option<ApiSource>,
    },
    #[serde(rename_all = "camelCase")]
    SetOpenModal {
        #[serde(default, alias = "modal")]
        open_modal: Option<String>,
    },
    UpdateSettings {
        settings: ApiSettings,
    },
    /// Any tag this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// A single action or an ordered list of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionBatch {
    Many(Vec<ApiAction>),
    One(ApiAction),
}

impl ActionBatch {
    /// Flatten into dispatch order.
    pub fn into_vec(self) -> Vec<ApiAction> {
        match self {
            Self::Many(actions) => actions,
            Self::One(action) => vec![action],
        }
    }
}

// ── Push channel ─────────────────────────────────────────────────────

/// One message received over the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum PushMessage {
    /// Display-only text.
    Notification(String),
    /// Actions to apply to the store, in order.
    Action(ActionBatch),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn node_tolerates_missing_fields() {
        let node: ApiNode = serde_json::from_value(json!({
            "dataId": "a",
            "dtaleUrl": null
        }))
        .unwrap();
        assert_eq!(node.data_id, "a");
        assert!(node.visible);
        assert_eq!(node.source_id, "");
        assert_eq!(node.dtale_url, None);
    }

    #[test]
    fn source_serializes_without_nodes() {
        let source: ApiSource = serde_json::from_value(json!({
            "id": "s1",
            "name": "CSV files",
            "nodes": {
                "a": { "dataId": "a", "sourceId": "s1", "path": "/tmp/a.csv", "sortValue": 1 }
            },
            "listPaths": "def main(): ...",
            "getData": "def main(path): ..."
        }))
        .unwrap();
        assert_eq!(source.nodes.len(), 1);

        let body = serde_json::to_value(&source).unwrap();
        assert!(body.get("nodes").is_none());
        assert_eq!(body["listPaths"], "def main(): ...");
        assert_eq!(body["nodesFullyLoaded"], false);
    }

    #[test]
    fn settings_keep_unknown_toggles() {
        let settings: ApiSettings = serde_json::from_value(json!({
            "disableEditLayout": true,
            "enableWebsocketConnections": true,
            "appTitle": "Research",
            "darkModeDefault": true
        }))
        .unwrap();
        assert!(settings.disable_edit_layout);
        assert!(settings.enable_websocket_connections);
        assert_eq!(settings.app_title.as_deref(), Some("Research"));
        assert_eq!(settings.extra["darkModeDefault"], json!(true));
    }

    #[test]
    fn action_tags() {
        let action: ApiAction = serde_json::from_value(json!({
            "type": "SET_NODE_UPDATING",
            "dataId": "a",
            "updating": false
        }))
        .unwrap();
        assert_eq!(
            action,
            ApiAction::SetNodeUpdating {
                data_id: "a".into(),
                updating: false
            }
        );

        let action: ApiAction = serde_json::from_value(json!({
            "type": "SET_SOURCE_UPDATING",
            "sourceId": "s1"
        }))
        .unwrap();
        assert_eq!(
            action,
            ApiAction::SetSourceUpdating {
                source_id: "s1".into(),
                updating: true
            }
        );

        let action: ApiAction =
            serde_json::from_value(json!({ "type": "SET_OPEN_MODAL", "openModal": null }))
                .unwrap();
        assert_eq!(action, ApiAction::SetOpenModal { open_modal: None });
    }

    #[test]
    fn unknown_action_tag() {
        let action: ApiAction =
            serde_json::from_value(json!({ "type": "DELETE_EVERYTHING", "x": 1 })).unwrap();
        assert_eq!(action, ApiAction::Unknown);
    }

    #[test]
    fn push_message_shapes() {
        let msg: PushMessage =
            serde_json::from_value(json!({ "type": "notification", "payload": "done" })).unwrap();
        assert_eq!(msg, PushMessage::Notification("done".into()));

        let msg: PushMessage = serde_json::from_value(json!({
            "type": "action",
            "payload": [
                { "type": "SET_OPEN_MODAL", "openModal": null },
                { "type": "SET_SELECTED_SOURCE", "source": null }
            ]
        }))
        .unwrap();
        let PushMessage::Action(batch) = msg else {
            panic!("expected action message");
        };
        assert_eq!(batch.into_vec().len(), 2);
    }
}
