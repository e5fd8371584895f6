// ── Store container ──
//
// Owns the single `RootState`. Every mutation goes through `dispatch`,
// which runs the reducer and publishes the new snapshot atomically.
// Readers only ever see whole snapshots.

mod stream;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::trace;

pub use stream::{StateStream, StateWatchStream};

use crate::action::Action;
use crate::model::RootState;
use crate::reducer::reduce;

const APPLIED_CHANNEL_CAPACITY: usize = 256;

/// Single owner of the root state.
pub struct Store {
    state: watch::Sender<Arc<RootState>>,
    applied: broadcast::Sender<Action>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(RootState::default())
    }

    pub fn with_state(state: RootState) -> Self {
        let (state, _) = watch::channel(Arc::new(state));
        let (applied, _) = broadcast::channel(APPLIED_CHANNEL_CAPACITY);
        Self { state, applied }
    }

    /// Apply one action. The reducer and the `applied` broadcast both run
    /// under the channel lock, so concurrent dispatches are serialized and
    /// published in the order they were applied.
    pub fn dispatch(&self, action: Action) {
        trace!(kind = action.kind(), "dispatch");
        let published = action.clone();
        self.state.send_modify(|state| {
            *state = Arc::new(reduce(state, action));
            // No subscribers is fine.
            let _ = self.applied.send(published);
        });
    }

    /// Apply actions in order.
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<RootState> {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    /// Every action after it has been applied, in dispatch order.
    pub fn applied(&self) -> broadcast::Receiver<Action> {
        self.applied.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{LoadState, Modal};

    #[test]
    fn dispatch_replaces_snapshot() {
        let store = Store::new();
        let before = store.snapshot();

        store.dispatch(Action::SetOpenModal(Some(Modal::Filters)));
        let after = store.snapshot();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.open_modal, None);
        assert_eq!(after.open_modal, Some(Modal::Filters));
    }

    #[test]
    fn applied_actions_arrive_in_order() {
        let store = Store::new();
        let mut rx = store.applied();

        store.dispatch_all([Action::Unknown, Action::SetError(Some("x".into()))]);

        assert_eq!(rx.try_recv().unwrap(), Action::Unknown);
        assert_eq!(rx.try_recv().unwrap(), Action::SetError(Some("x".into())));
        assert_eq!(store.snapshot().sources, LoadState::Loaded(Vec::new()));
    }

    #[test]
    fn applied_order_matches_state_under_contention() {
        let store = Store::new();
        let mut rx = store.applied();

        std::thread::scope(|scope| {
            for worker in 0..2 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..100 {
                        store.dispatch(Action::SetError(Some(format!("t{worker}-{i}"))));
                    }
                });
            }
        });

        let mut last = None;
        while let Ok(action) = rx.try_recv() {
            last = Some(action);
        }
        assert_eq!(last, Some(Action::SetError(store.snapshot().error.clone())));
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = Store::new();
        let mut stream = store.subscribe();
        assert_eq!(stream.current().open_modal, None);

        store.dispatch(Action::SetOpenModal(Some(Modal::LayoutEditor)));
        let next = stream.changed().await.unwrap();
        assert_eq!(next.open_modal, Some(Modal::LayoutEditor));
        assert!(Arc::ptr_eq(&next, stream.current()));
    }

    #[tokio::test]
    async fn stream_yields_current_then_updates() {
        use futures_util::StreamExt;

        let store = Store::new();
        let mut stream = store.subscribe().into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.open_modal, None);

        store.dispatch(Action::SetOpenModal(Some(Modal::Filters)));
        let second = stream.next().await.unwrap();
        assert_eq!(second.open_modal, Some(Modal::Filters));
    }
}
