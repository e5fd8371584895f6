//! Shared helpers for command handlers.

use std::path::Path;
use std::sync::Arc;

use dtdesk_core::{Node, Panel, RootState, Settings, Source, selectors};

use crate::error::CliError;

/// Look up a loaded source by id.
pub fn resolve_source(state: &RootState, id: &str) -> Result<Arc<Source>, CliError> {
    selectors::source_by_id(state, id)
        .cloned()
        .ok_or_else(|| CliError::source_not_found(id))
}

/// Look up a loaded node by data id.
pub fn resolve_node(state: &RootState, data_id: &str) -> Result<Arc<Node>, CliError> {
    selectors::node_by_id(state, data_id)
        .cloned()
        .ok_or_else(|| CliError::node_not_found(data_id))
}

/// Server settings, or defaults if the server sent none.
pub fn settings(panel: &Panel) -> Arc<Settings> {
    panel.snapshot().settings.clone().unwrap_or_default()
}

/// Fail with `Disabled` when a server toggle turns a feature off.
pub fn ensure_enabled(disabled: bool, feature: &str) -> Result<(), CliError> {
    if disabled {
        Err(CliError::Disabled {
            feature: feature.into(),
        })
    } else {
        Ok(())
    }
}

/// Read a script file for `--list-paths` / `--get-data` / `--save-data`.
pub fn read_script(path: &Path, field: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })
}

pub fn print_notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
