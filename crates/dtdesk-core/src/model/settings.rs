// ── Server settings ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Process-wide feature toggles. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub disable_add_sources: bool,
    pub disable_edit_sources: bool,
    pub disable_edit_layout: bool,
    pub disable_profile_reports: bool,
    pub enable_push_channel: bool,
    pub app_title: Option<String>,
    pub header: Option<String>,
    /// Toggles without a dedicated field.
    pub extra: BTreeMap<String, serde_json::Value>,
}
