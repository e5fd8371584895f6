// ── Event vocabulary ──
//
// Every state change in the store is one of these. Server responses and
// push messages are converted into `Action`s before reaching the reducer.

use std::sync::Arc;

use strum::IntoStaticStr;

use crate::model::{Modal, Node, Settings, Source};

/// A state-update event.
///
/// Entity payloads are carried by `Arc` so an action can be applied and
/// broadcast without deep-copying the catalog.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Merge sources into the catalog. The first one marks it loaded.
    AddSources(Vec<Arc<Source>>),
    /// Replace every source with the same id.
    UpdateSource(Arc<Source>),
    SetSourceUpdating { id: String, updating: bool },
    /// Replace the node with the same `data_id`, wherever it lives.
    UpdateNode(Arc<Node>),
    SetNodeUpdating { data_id: String, updating: bool },
    SetSelectedSource(Option<Arc<Source>>),
    SetOpenModal(Option<Modal>),
    UpdateSettings(Arc<Settings>),
    /// Catalog fetch started (`true`) or failed before any data (`false`).
    SetSourcesLoading(bool),
    /// Last request failure, or `None` to dismiss it.
    SetError(Option<String>),
    /// An event this client does not recognize.
    Unknown,
}

impl Action {
    /// Wire tag, e.g. `UPDATE_NODE`. Used for logging.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_wire_tags() {
        assert_eq!(Action::Unknown.kind(), "UNKNOWN");
        assert_eq!(Action::SetOpenModal(None).kind(), "SET_OPEN_MODAL");
        assert_eq!(
            Action::SetNodeUpdating {
                data_id: "a".into(),
                updating: true
            }
            .kind(),
            "SET_NODE_UPDATING"
        );
    }
}
