use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace};

/// SSE event name carried by every change notification on the wire.
pub const CHANGE_EVENT_NAME: &str = "bookings_changed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Cleared,
    /// Emitted locally when a subscriber fell behind and dropped events.
    Resync,
}

/// "The booking set changed". Carries no diff: receivers re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub emitted_at: i64,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            emitted_at: Utc::now().timestamp(),
        }
    }

    pub fn inserted() -> Self {
        Self::new(ChangeKind::Inserted)
    }

    pub fn cleared() -> Self {
        Self::new(ChangeKind::Cleared)
    }

    pub fn resync() -> Self {
        Self::new(ChangeKind::Resync)
    }
}

/// Publish/subscribe channel for booking changes.
///
/// Delivery is best-effort, at-least-once and unordered. Publishing never
/// fails the caller; implementations log delivery problems themselves.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn publish(&self, event: ChangeEvent);

    /// Register a new subscriber. Dropping the handle unregisters it.
    fn subscribe(&self) -> ChangeSubscription;
}

/// Receiving end of a [`ChangeNotifier`].
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { rx }
    }

    /// Next change, or `None` once the notifier is gone.
    ///
    /// Falling behind collapses the missed events into one `Resync`.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                debug!("Change subscriber lagged, {} events collapsed into resync", skipped);
                Some(ChangeEvent::resync())
            }
            Err(RecvError::Closed) => None,
        }
    }

    pub fn into_receiver(self) -> broadcast::Receiver<ChangeEvent> {
        self.rx
    }
}

/// In-process notifier backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fan an event out to local subscribers only.
    pub fn send(&self, event: ChangeEvent) {
        // Err only means nobody is listening right now
        if self.tx.send(event).is_err() {
            trace!("No change subscribers for {:?}", event.kind);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl ChangeNotifier for BroadcastNotifier {
    async fn publish(&self, event: ChangeEvent) {
        self.send(event);
    }

    fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription::new(self.tx.subscribe())
    }
}
