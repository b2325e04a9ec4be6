use courier_domain::Notification;
use tokio::sync::broadcast;

/// Cross-instance notification feed. Another process (or a sync layer) can
/// publish notifications it persisted so that this instance updates its
/// session cache without re-reading the store.
#[derive(Clone)]
pub struct NotificationFeed {
    tx: broadcast::Sender<Notification>,
}

impl NotificationFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, notification: Notification) {
        // Nobody listening yet is not an error
        let _ = self.tx.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
