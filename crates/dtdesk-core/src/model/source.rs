// ── Source domain type ──

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::node::Node;
use crate::error::CoreError;

const LIST_PATHS_TEMPLATE: &str = r#"from typing import Iterable


def main() -> Iterable[str]:
    """
    Return an iterable of paths identifying where data is located, such as file paths or URLs.
    These paths will be passed to your function in get_data.py.
    """
    raise NotImplementedError()
"#;

const GET_DATA_TEMPLATE: &str = r#"import pandas as pd


def main(path: str) -> pd.DataFrame:
    """
    Given a path, retrieve that data and return it as a pandas dataframe
    """
    raise NotImplementedError()
"#;

/// User-authored retrieval scripts. Opaque to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCode {
    pub list_paths: String,
    pub get_data: String,
    pub save_data: String,
}

/// A configured data-retrieval package and the nodes loaded from it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    pub package_name: String,
    pub package_path: String,
    pub editable: bool,
    pub visible: bool,
    /// Absent values sort after every present one.
    pub sort_value: Option<i64>,
    /// Keyed by `data_id`.
    pub nodes: IndexMap<String, Arc<Node>>,
    pub nodes_fully_loaded: bool,
    pub error: Option<String>,
    pub updating: bool,
    #[serde(flatten)]
    pub code: SourceCode,
}

impl Source {
    /// Blank draft for the "new source" editor, pre-filled with script stubs.
    pub fn template() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            package_name: String::new(),
            package_path: String::new(),
            editable: true,
            visible: true,
            sort_value: None,
            nodes: IndexMap::new(),
            nodes_fully_loaded: false,
            error: None,
            updating: false,
            code: SourceCode {
                list_paths: LIST_PATHS_TEMPLATE.to_owned(),
                get_data: GET_DATA_TEMPLATE.to_owned(),
                save_data: String::new(),
            },
        }
    }

    pub fn sort_key(&self) -> i64 {
        self.sort_value.unwrap_or(i64::MAX)
    }

    /// Position of the node with this `data_id` in the node map.
    pub fn node_index(&self, data_id: &str) -> Option<usize> {
        self.nodes
            .values()
            .position(|node| node.data_id == data_id)
    }

    pub fn node(&self, data_id: &str) -> Option<&Arc<Node>> {
        self.node_index(data_id)
            .and_then(|idx| self.nodes.get_index(idx))
            .map(|(_, node)| node)
    }

    pub fn contains_node(&self, data_id: &str) -> bool {
        self.node_index(data_id).is_some()
    }

    /// Copy with only the busy flag changed.
    pub fn with_updating(&self, updating: bool) -> Self {
        Self {
            updating,
            ..self.clone()
        }
    }

    /// Check a draft before it is sent to the server.
    pub fn validate_draft(&self) -> Result<(), CoreError> {
        let missing: Vec<&str> = [
            ("name", self.name.as_str()),
            ("listPaths", self.code.list_paths.as_str()),
            ("getData", self.code.get_data.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed {
                message: format!("Fill out the required fields: {}", missing.join(", ")),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn template_needs_a_name() {
        let draft = Source::template();
        let err = draft.validate_draft().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Fill out the required fields: name"
        );

        let named = Source {
            name: "Parquet files".into(),
            ..draft
        };
        assert!(named.validate_draft().is_ok());
    }

    #[test]
    fn blank_scripts_are_reported() {
        let mut draft = Source::template();
        draft.name = "x".into();
        draft.code.list_paths = "  \n".into();
        draft.code.get_data.clear();
        let err = draft.validate_draft().unwrap_err();
        assert!(err.to_string().ends_with("listPaths, getData"));
    }

    #[test]
    fn missing_sort_value_sorts_last() {
        let mut source = Source::template();
        assert_eq!(source.sort_key(), i64::MAX);
        source.sort_value = Some(3);
        assert_eq!(source.sort_key(), 3);
    }
}
