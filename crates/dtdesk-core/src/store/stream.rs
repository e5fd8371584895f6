// ── State subscriptions ──

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::RootState;

/// A subscription to root state snapshots.
///
/// Gives point-in-time access plus change notification, either through
/// [`changed`](Self::changed) or as a `Stream`.
pub struct StateStream {
    current: Arc<RootState>,
    receiver: watch::Receiver<Arc<RootState>>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<RootState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot as of the last `changed()` (or creation).
    pub fn current(&self) -> &Arc<RootState> {
        &self.current
    }

    pub fn latest(&self) -> Arc<RootState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<RootState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` of snapshots, starting with the current one.
pub struct StateWatchStream {
    inner: WatchStream<Arc<RootState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<RootState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
