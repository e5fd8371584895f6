// ── Layout editor draft ──
//
// Working copy of source ordering and visibility. Reordering reassigns
// the original sort values by position, and only entries that differ
// from the catalog are sent to the server.

use std::sync::Arc;

use serde::Serialize;

use crate::model::Source;

/// One row of the layout editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub sort_value: i64,
}

/// Body item of a layout save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChange {
    pub id: String,
    pub visible: bool,
    pub sort_value: i64,
}

/// Editable snapshot of the catalog order.
#[derive(Debug, Clone)]
pub struct LayoutDraft {
    original: Vec<LayoutEntry>,
    entries: Vec<LayoutEntry>,
}

impl LayoutDraft {
    /// Capture the current catalog order.
    ///
    /// Sources without a sort value get slots past the largest present
    /// one, in catalog order, so saving any row keeps them at the end.
    pub fn from_sources(sources: &[Arc<Source>]) -> Self {
        let base = sources
            .iter()
            .filter_map(|s| s.sort_value)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let original: Vec<LayoutEntry> = sources
            .iter()
            .enumerate()
            .map(|(idx, s)| LayoutEntry {
                id: s.id.clone(),
                name: s.name.clone(),
                visible: s.visible,
                sort_value: s.sort_value.unwrap_or_else(|| {
                    base.saturating_add(i64::try_from(idx).unwrap_or(i64::MAX))
                }),
            })
            .collect();
        Self {
            entries: original.clone(),
            original,
        }
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Move the row at `from` to `to`. Returns `false` if either is out of range.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
            self.reassign_sort_values();
        }
        true
    }

    /// Flip visibility of the row with this id. Returns the new value.
    pub fn toggle_visible(&mut self, id: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.visible = !entry.visible;
        Some(entry.visible)
    }

    /// Entries whose visibility or sort value differ from the catalog.
    pub fn changes(&self) -> Vec<LayoutChange> {
        self.entries
            .iter()
            .filter(|entry| {
                self.original
                    .iter()
                    .find(|o| o.id == entry.id)
                    .is_none_or(|o| o.visible != entry.visible || o.sort_value != entry.sort_value)
            })
            .map(|entry| LayoutChange {
                id: entry.id.clone(),
                visible: entry.visible,
                sort_value: entry.sort_value,
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    fn reassign_sort_values(&mut self) {
        let mut slots: Vec<i64> = self.original.iter().map(|e| e.sort_value).collect();
        slots.sort_unstable();
        for (entry, slot) in self.entries.iter_mut().zip(slots) {
            entry.sort_value = slot;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn source(id: &str, sort_value: Option<i64>) -> Arc<Source> {
        let mut s = Source::template();
        s.id = id.into();
        s.name = id.to_uppercase();
        s.sort_value = sort_value;
        Arc::new(s)
    }

    #[test]
    fn untouched_draft_has_no_changes() {
        let draft = LayoutDraft::from_sources(&[source("a", Some(0)), source("b", Some(1))]);
        assert!(draft.changes().is_empty());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn move_reassigns_sort_values_by_position() {
        let mut draft = LayoutDraft::from_sources(&[
            source("a", Some(10)),
            source("b", Some(20)),
            source("c", Some(30)),
        ]);
        assert!(draft.move_entry(2, 0));

        let order: Vec<_> = draft
            .entries()
            .iter()
            .map(|e| (e.id.as_str(), e.sort_value))
            .collect();
        assert_eq!(order, vec![("c", 10), ("a", 20), ("b", 30)]);
        assert_eq!(draft.changes().len(), 3);
    }

    #[test]
    fn toggle_sends_only_that_row() {
        let mut draft = LayoutDraft::from_sources(&[source("a", Some(0)), source("b", Some(1))]);
        assert_eq!(draft.toggle_visible("b"), Some(false));
        assert_eq!(
            draft.changes(),
            vec![LayoutChange {
                id: "b".into(),
                visible: false,
                sort_value: 1
            }]
        );
        assert_eq!(draft.toggle_visible("missing"), None);
    }

    #[test]
    fn out_of_range_move_is_rejected() {
        let mut draft = LayoutDraft::from_sources(&[source("a", Some(0))]);
        assert!(!draft.move_entry(0, 1));
        assert!(draft.move_entry(0, 0));
        assert!(draft.changes().is_empty());
    }

    #[test]
    fn missing_sort_values_go_last() {
        let mut draft = LayoutDraft::from_sources(&[source("a", Some(0)), source("b", None)]);
        assert_eq!(draft.entries()[1].sort_value, 2);
        draft.move_entry(1, 0);
        assert_eq!(draft.entries()[0].id, "b");
        assert_eq!(draft.entries()[0].sort_value, 0);
    }

    #[test]
    fn toggling_unsorted_source_keeps_it_last() {
        let sources = [source("a", Some(5)), source("b", None)];
        let mut draft = LayoutDraft::from_sources(&sources);
        draft.toggle_visible("b");

        let changes = draft.changes();
        assert_eq!(
            changes,
            vec![LayoutChange {
                id: "b".into(),
                visible: false,
                sort_value: 6
            }]
        );

        let mut saved = (*sources[1]).clone();
        saved.visible = changes[0].visible;
        saved.sort_value = Some(changes[0].sort_value);
        let state = crate::reducer::reduce(
            &crate::model::RootState::default(),
            crate::action::Action::AddSources(vec![Arc::clone(&sources[0]), Arc::new(saved)]),
        );
        let order: Vec<_> = state
            .sources
            .loaded()
            .unwrap()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
