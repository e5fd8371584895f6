// ── Reducer ──
//
// Pure transition function over the root state. Every action yields a
// fresh `RootState`; entities the action does not touch are carried over
// by `Arc` so consumers can detect changes with pointer equality.
//
// Events that reference an id the store does not hold are dropped
// silently. Entity events against a catalog that has not finished
// loading are dropped the same way.

use std::sync::Arc;

use tracing::debug;

use crate::action::Action;
use crate::model::{LoadState, Node, RootState, Source};

/// Apply one action to `state`, returning the next state.
pub fn reduce(state: &RootState, action: Action) -> RootState {
    let mut next = state.clone();

    match action {
        Action::AddSources(incoming) => {
            let mut sources = incoming;
            if let Some(existing) = state.sources.loaded() {
                sources.extend(existing.iter().cloned());
            }
            sort_sources(&mut sources);
            next.sources = LoadState::Loaded(sources);
        }

        Action::UpdateSource(source) => {
            if let LoadState::Loaded(sources) = &mut next.sources {
                replace_source(sources, &source);
            }
        }

        Action::SetSourceUpdating { id, updating } => {
            if let LoadState::Loaded(sources) = &mut next.sources {
                for slot in sources.iter_mut().filter(|s| s.id == id) {
                    if slot.updating != updating {
                        *slot = Arc::new(slot.with_updating(updating));
                    }
                }
            }
        }

        Action::UpdateNode(node) => {
            if let LoadState::Loaded(sources) = &mut next.sources {
                update_node(sources, &node.data_id, |_| Arc::clone(&node));
            }
        }

        Action::SetNodeUpdating { data_id, updating } => {
            if let LoadState::Loaded(sources) = &mut next.sources {
                update_node(sources, &data_id, |current| {
                    if current.updating == updating {
                        Arc::clone(current)
                    } else {
                        Arc::new(current.with_updating(updating))
                    }
                });
            }
        }

        Action::SetSelectedSource(source) => next.selected_source = source,
        Action::SetOpenModal(modal) => next.open_modal = modal,
        Action::UpdateSettings(settings) => next.settings = Some(settings),
        Action::SetError(error) => next.error = error,

        Action::SetSourcesLoading(loading) => {
            next.sources = match (&state.sources, loading) {
                (LoadState::NotLoaded, true) => LoadState::Loading,
                (LoadState::Loading, false) => LoadState::NotLoaded,
                (current, _) => current.clone(),
            };
        }

        Action::Unknown => {
            if matches!(state.sources, LoadState::NotLoaded) {
                next.sources = LoadState::Loaded(Vec::new());
            }
        }
    }

    next
}

/// Stable ascending sort by `sort_value`. Missing values sort last.
fn sort_sources(sources: &mut [Arc<Source>]) {
    sources.sort_by_key(|s| s.sort_key());
}

fn replace_source(sources: &mut Vec<Arc<Source>>, source: &Arc<Source>) {
    let mut found = false;
    for slot in sources.iter_mut().filter(|s| s.id == source.id) {
        *slot = Arc::clone(source);
        found = true;
    }

    if found {
        sort_sources(sources);
    } else {
        debug!(source_id = %source.id, "update for unknown source dropped");
    }
}

/// Replace the node with `data_id` inside the source that actually holds it.
///
/// The node's own `source_id` is ignored. The map key is kept, so the
/// entry stays where it was.
fn update_node<F>(sources: &mut [Arc<Source>], data_id: &str, replace: F)
where
    F: FnOnce(&Arc<Node>) -> Arc<Node>,
{
    let Some((source_idx, node_idx)) = sources
        .iter()
        .enumerate()
        .find_map(|(i, s)| s.node_index(data_id).map(|n| (i, n)))
    else {
        debug!(data_id, "update for unknown node dropped");
        return;
    };

    let owner = &sources[source_idx];
    let Some((_, current)) = owner.nodes.get_index(node_idx) else {
        return;
    };
    let replacement = replace(current);
    if Arc::ptr_eq(current, &replacement) {
        return;
    }

    let mut source = Source::clone(owner);
    if let Some((_, slot)) = source.nodes.get_index_mut(node_idx) {
        *slot = replacement;
    }
    sources[source_idx] = Arc::new(source);
}
