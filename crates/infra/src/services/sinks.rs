use courier_domain::{Channel, Notification};
use serde_json::json;
use tokio::sync::broadcast;

/// A best-effort delivery channel. Failures are reported to the caller, which
/// logs them and moves on, they never block cache or store consistency.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    fn channel(&self) -> Channel;
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Posts the notification as JSON to a client-registered push relay,
/// authenticated with a shared secret header.
pub struct WebhookPushSink {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl WebhookPushSink {
    pub fn new(url: String, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            key,
        }
    }
}

#[async_trait::async_trait]
impl NotificationSink for WebhookPushSink {
    fn channel(&self) -> Channel {
        Channel::Push
    }

    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .header("courier-webhook-key", &self.key)
            .json(notification)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Hands the notification to an email relay endpoint which renders and sends
/// the actual mail.
pub struct EmailRelaySink {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl EmailRelaySink {
    pub fn new(url: String, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            key,
        }
    }
}

#[async_trait::async_trait]
impl NotificationSink for EmailRelaySink {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .header("courier-webhook-key", &self.key)
            .json(&json!({
                "user_id": notification.user_id,
                "subject": notification.title,
                "body": notification.message,
                "action_ref": notification.action_ref,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Publishes the notification on a local broadcast channel for the
/// presentation layer to render, the OS-level popup equivalent.
pub struct InAppEventSink {
    tx: broadcast::Sender<Notification>,
}

impl InAppEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

#[async_trait::async_trait]
impl NotificationSink for InAppEventSink {
    fn channel(&self) -> Channel {
        Channel::InApp
    }

    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        // No subscribers is fine, nobody is looking at the UI right now
        let _ = self.tx.send(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use courier_domain::{NotificationType, Priority, ID};

    fn notification_factory() -> Notification {
        Notification {
            id: Default::default(),
            user_id: ID::new(),
            title: "Renewal due".into(),
            message: "The Acme contract renews this week".into(),
            notification_type: NotificationType::Renewal,
            priority: Priority::High,
            read: false,
            read_at: None,
            created_at: 0,
            action_ref: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn in_app_sink_reaches_subscribers() {
        let sink = InAppEventSink::new(8);
        let mut rx = sink.subscribe();
        let notification = notification_factory();

        sink.deliver(&notification).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().id, notification.id);
    }

    #[tokio::test]
    async fn in_app_sink_without_subscribers_is_ok() {
        let sink = InAppEventSink::new(8);
        assert!(sink.deliver(&notification_factory()).await.is_ok());
    }
}
