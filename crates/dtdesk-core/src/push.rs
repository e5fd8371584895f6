// ── Push listener ──
//
// Bridges the API crate's push channel into the store. Action messages
// go through the same `Store::dispatch` the gateway uses; notifications
// are forwarded for display only. No buffering or resend: whatever
// arrives while connected is applied, nothing else.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dtdesk_api::{PushHandle, PushMessage, ReconnectConfig};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::action::Action;
use crate::error::CoreError;
use crate::store::Store;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

struct ActiveSubscription {
    id: u64,
    handle: PushHandle,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

type ActiveSlot = Arc<Mutex<Option<ActiveSubscription>>>;

/// Single logical push subscription for the session.
pub struct PushListener {
    store: Arc<Store>,
    notifications: broadcast::Sender<String>,
    subscribed: Arc<watch::Sender<bool>>,
    active: ActiveSlot,
    next_id: AtomicU64,
}

impl PushListener {
    pub fn new(store: Arc<Store>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        let (subscribed, _) = watch::channel(false);
        Self {
            store,
            notifications,
            subscribed: Arc::new(subscribed),
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Open the subscription. A second call while active is a no-op.
    ///
    /// If the transport gives up reconnecting, the subscription ends on
    /// its own and `subscribed` flips back to `false`.
    pub async fn start(&self, ws_url: Url, reconnect: ReconnectConfig) -> Result<(), CoreError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            debug!("push listener already running");
            return Ok(());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let handle = PushHandle::connect(ws_url.clone(), reconnect, cancel.clone())?;
        let rx = handle.subscribe();

        let store = Arc::clone(&self.store);
        let notifications = self.notifications.clone();
        let slot = Arc::clone(&self.active);
        let subscribed = Arc::clone(&self.subscribed);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            if bridge_task(store, notifications, rx, task_cancel).await == BridgeExit::Closed {
                release(&slot, &subscribed, id).await;
            }
        });

        *active = Some(ActiveSubscription {
            id,
            handle,
            cancel,
            task,
        });
        self.subscribed.send_replace(true);
        info!(url = %ws_url, "push listener started");
        Ok(())
    }

    /// Close the subscription and wait for the bridge task to finish.
    pub async fn stop(&self) {
        let Some(active) = self.active.lock().await.take() else {
            return;
        };
        active.handle.shutdown();
        active.cancel.cancel();
        let _ = active.task.await;
        self.subscribed.send_replace(false);
        info!("push listener stopped");
    }

    pub async fn is_subscribed(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Observe subscribe / unsubscribe.
    pub fn subscribed(&self) -> watch::Receiver<bool> {
        self.subscribed.subscribe()
    }

    /// Socket-level connection flag of the running subscription.
    pub async fn connected(&self) -> Option<watch::Receiver<bool>> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| active.handle.connected())
    }

    /// Display-only notification text.
    pub fn notifications(&self) -> broadcast::Receiver<String> {
        self.notifications.subscribe()
    }
}

/// Drop subscription `id` after its transport ended. A newer
/// subscription in the slot is left alone.
async fn release(slot: &ActiveSlot, subscribed: &watch::Sender<bool>, id: u64) {
    let mut active = slot.lock().await;
    if active.as_ref().is_some_and(|a| a.id == id) {
        *active = None;
        subscribed.send_replace(false);
        warn!("push channel gave up, subscription ended");
    }
}

// ── Bridge ───────────────────────────────────────────────────────────

/// Why the bridge stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeExit {
    Cancelled,
    Closed,
}

async fn bridge_task(
    store: Arc<Store>,
    notifications: broadcast::Sender<String>,
    mut rx: broadcast::Receiver<Arc<PushMessage>>,
    cancel: CancellationToken,
) -> BridgeExit {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return BridgeExit::Cancelled,
            msg = rx.recv() => match msg {
                Ok(msg) => apply_message(&store, &notifications, &msg),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "push listener lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return BridgeExit::Closed,
            },
        }
    }
}

/// Route one push message: actions to the store, notifications out.
pub(crate) fn apply_message(
    store: &Store,
    notifications: &broadcast::Sender<String>,
    msg: &PushMessage,
) {
    match msg {
        PushMessage::Notification(text) => {
            debug!(text = %text, "push notification");
            let _ = notifications.send(text.clone());
        }
        PushMessage::Action(batch) => {
            let actions = batch.clone().into_vec();
            debug!(count = actions.len(), "push actions");
            store.dispatch_all(actions.into_iter().map(Action::from));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::model::{LoadState, Modal};
    use crate::selectors;

    fn message(value: serde_json::Value) -> PushMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn action_batch_applies_in_order() {
        let store = Store::new();
        store.dispatch(Action::AddSources(vec![]));
        let (tx, _) = broadcast::channel(4);

        apply_message(
            &store,
            &tx,
            &message(json!({
                "type": "action",
                "payload": { "type": "ADD_SOURCES", "sources": [{ "id": "S1", "name": "one", "sortValue": 0 }] }
            })),
        );
        store.dispatch(Action::SetOpenModal(Some(Modal::LayoutEditor)));

        apply_message(
            &store,
            &tx,
            &message(json!({
                "type": "action",
                "payload": [
                    { "type": "UPDATE_SOURCE", "source": { "id": "S1", "name": "one, renamed", "sortValue": 0 } },
                    { "type": "SET_OPEN_MODAL", "openModal": null }
                ]
            })),
        );

        let state = store.snapshot();
        assert_eq!(state.open_modal, None);
        assert_eq!(
            selectors::source_by_id(&state, "S1").unwrap().name,
            "one, renamed"
        );
    }

    #[test]
    fn notifications_do_not_touch_state() {
        let store = Store::new();
        let (tx, mut rx) = broadcast::channel(4);
        let before = store.snapshot();

        apply_message(
            &store,
            &tx,
            &message(json!({ "type": "notification", "payload": "profile report ready" })),
        );

        assert_eq!(rx.try_recv().unwrap(), "profile report ready");
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.snapshot().sources, LoadState::NotLoaded);
    }

    #[tokio::test]
    async fn stop_without_start_is_harmless() {
        let listener = PushListener::new(Arc::new(Store::new()));
        listener.stop().await;
        assert!(!listener.is_subscribed().await);
        assert!(listener.connected().await.is_none());
    }

    #[tokio::test]
    async fn start_rejects_http_url() {
        let listener = PushListener::new(Arc::new(Store::new()));
        let url = Url::parse("http://localhost:5000/ws/1/").unwrap();
        let err = listener.start(url, ReconnectConfig::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert!(!*listener.subscribed().borrow());
    }

    fn notification(text: &str) -> Arc<PushMessage> {
        Arc::new(PushMessage::Notification(text.into()))
    }

    #[tokio::test]
    async fn bridge_stops_on_cancel() {
        let (_push_tx, push_rx) = broadcast::channel(4);
        let (notify_tx, _) = broadcast::channel(4);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let exit = bridge_task(Arc::new(Store::new()), notify_tx, push_rx, cancel).await;
        assert_eq!(exit, BridgeExit::Cancelled);
    }

    #[tokio::test]
    async fn bridge_forwards_until_closed() {
        let (push_tx, push_rx) = broadcast::channel(4);
        let (notify_tx, mut notify_rx) = broadcast::channel(4);

        push_tx.send(notification("one")).unwrap();
        push_tx.send(notification("two")).unwrap();
        drop(push_tx);

        let exit = bridge_task(
            Arc::new(Store::new()),
            notify_tx,
            push_rx,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(exit, BridgeExit::Closed);
        assert_eq!(notify_rx.try_recv().unwrap(), "one");
        assert_eq!(notify_rx.try_recv().unwrap(), "two");
    }

    #[tokio::test]
    async fn bridge_survives_lag() {
        let (push_tx, push_rx) = broadcast::channel(2);
        let (notify_tx, mut notify_rx) = broadcast::channel(8);

        for text in ["a", "b", "c", "d"] {
            push_tx.send(notification(text)).unwrap();
        }
        drop(push_tx);

        let exit = bridge_task(
            Arc::new(Store::new()),
            notify_tx,
            push_rx,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(exit, BridgeExit::Closed);
        assert_eq!(notify_rx.try_recv().unwrap(), "c");
        assert_eq!(notify_rx.try_recv().unwrap(), "d");
        assert!(notify_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn subscription_ends_when_transport_gives_up() {
        let listener = PushListener::new(Arc::new(Store::new()));
        let mut subscribed = listener.subscribed();
        let url = Url::parse("ws://127.0.0.1:1/ws/1/").unwrap();
        let reconnect = ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(10),
            max_retries: Some(0),
        };

        listener.start(url, reconnect).await.unwrap();
        assert!(*subscribed.borrow_and_update());

        tokio::time::timeout(Duration::from_secs(10), subscribed.wait_for(|on| !*on))
            .await
            .unwrap()
            .unwrap();
        assert!(!listener.is_subscribed().await);
        assert!(listener.connected().await.is_none());

        // Stopping after the transport already ended is a no-op.
        listener.stop().await;
    }
}
