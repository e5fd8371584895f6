// ── Selectors ──
//
// Pure reads over a `RootState` snapshot. Linear scans throughout: the
// catalog holds tens of sources and a few hundred nodes per page.

use std::sync::Arc;

use crate::model::{LoadState, Node, RootState, Source};

/// The loaded catalog, or an empty slice before the first load.
pub fn sources(state: &RootState) -> &[Arc<Source>] {
    match &state.sources {
        LoadState::Loaded(sources) => sources,
        LoadState::NotLoaded | LoadState::Loading => &[],
    }
}

/// Sources shown in the panel, in catalog order.
pub fn visible_sources(state: &RootState) -> Vec<&Arc<Source>> {
    sources(state).iter().filter(|s| s.visible).collect()
}

pub fn source_by_id<'a>(state: &'a RootState, id: &str) -> Option<&'a Arc<Source>> {
    sources(state).iter().find(|s| s.id == id)
}

/// The source whose node map holds `data_id`.
pub fn source_containing_node<'a>(state: &'a RootState, data_id: &str) -> Option<&'a Arc<Source>> {
    sources(state).iter().find(|s| s.contains_node(data_id))
}

/// Look up a node anywhere in the catalog.
///
/// Callers are expected to pass an id that is currently loaded; `None`
/// means the caller's view of the catalog is stale.
pub fn node_by_id<'a>(state: &'a RootState, data_id: &str) -> Option<&'a Arc<Node>> {
    source_containing_node(state, data_id).and_then(|s| s.node(data_id))
}

/// Nodes of a source ordered by `sort_value`, stable for ties.
pub fn sorted_nodes(source: &Source) -> Vec<&Arc<Node>> {
    let mut nodes: Vec<_> = source.nodes.values().collect();
    nodes.sort_by_key(|n| n.sort_value);
    nodes
}

/// Visible nodes whose path contains `query`, case-insensitively.
pub fn filter_nodes<'a>(source: &'a Source, query: &str) -> Vec<&'a Arc<Node>> {
    let needle = query.to_lowercase();
    sorted_nodes(source)
        .into_iter()
        .filter(|n| n.visible && (needle.is_empty() || n.path.to_lowercase().contains(&needle)))
        .collect()
}

/// Nodes of this source with a running table viewer.
pub fn active_node_count(source: &Source) -> usize {
    source
        .nodes
        .values()
        .filter(|n| n.urls.table.is_some())
        .count()
}

/// Whether another page of nodes can be requested for this source.
pub fn can_load_more(source: &Source) -> bool {
    !source.nodes_fully_loaded && !source.updating && source.error.is_none()
}

/// Settings and catalog have both arrived.
pub fn app_is_loaded(state: &RootState) -> bool {
    state.settings.is_some() && matches!(state.sources, LoadState::Loaded(_))
}
