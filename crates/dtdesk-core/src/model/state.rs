// ── Root state ──

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::settings::Settings;
use super::source::Source;

/// Three-state load marker, so "never loaded" is distinct from "empty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded | Self::Loading => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Modals the panel can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Modal {
    #[serde(rename = "layoutEditor")]
    #[strum(serialize = "layoutEditor")]
    LayoutEditor,
    #[serde(rename = "filters")]
    #[strum(serialize = "filters")]
    Filters,
}

/// The whole store. Owned by [`Store`](crate::Store), replaced on every event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    /// Sorted ascending by `sort_value`, stable for ties.
    pub sources: LoadState<Vec<Arc<Source>>>,
    /// Source currently open in the editor.
    pub selected_source: Option<Arc<Source>>,
    pub open_modal: Option<Modal>,
    /// `None` until the first settings load.
    pub settings: Option<Arc<Settings>>,
    /// Last transport failure surfaced by the request gateway.
    pub error: Option<String>,
}
