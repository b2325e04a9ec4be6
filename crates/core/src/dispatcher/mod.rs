mod cleanup_notifications;
mod create_notification;
mod delete_notification;
mod load_notifications;
mod mark_all_read;
mod mark_read;
mod notification_stats;

pub use notification_stats::NotificationStats;

use crate::error::CourierError;
use crate::shared::usecase::execute;
use cleanup_notifications::CleanupNotificationsUseCase;
use courier_domain::{Notification, NotificationInput, UserPreferences, ID};
use courier_infra::{CourierContext, NotificationSink};
use create_notification::CreateNotificationUseCase;
use delete_notification::DeleteNotificationUseCase;
use load_notifications::LoadNotificationsUseCase;
use mark_all_read::MarkAllReadUseCase;
use mark_read::MarkReadUseCase;
use notification_stats::NotificationStatsUseCase;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

pub type ListenerId = u64;

/// What observers receive after `load` and after every mutating operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

type Listener = Arc<dyn Fn(&NotificationSnapshot) + Send + Sync>;

struct Session {
    user_id: ID,
    notifications: Vec<Notification>,
}

/// Maintains the notification cache for the current session's user, fans new
/// notifications out to the channel sinks subject to user preferences, and
/// notifies registered observers with a fresh snapshot after every change.
///
/// The store owns the records, the cache is a bounded, newest-first view.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    ctx: CourierContext,
    sinks: Vec<Arc<dyn NotificationSink>>,
    session: Mutex<Option<Session>>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    listener_seq: AtomicU64,
}

impl NotificationDispatcher {
    pub fn new(ctx: CourierContext, sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                ctx,
                sinks,
                session: Mutex::new(None),
                listeners: Mutex::new(Vec::new()),
                listener_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Replaces the session cache with the user's most recent notifications
    /// and notifies listeners.
    pub async fn load(&self, user_id: &ID) -> Result<NotificationSnapshot, CourierError> {
        let notifications = execute(
            LoadNotificationsUseCase {
                user_id: user_id.clone(),
                limit: self.inner.ctx.config.notification_cache_limit,
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        {
            let mut session = self.inner.session.lock().unwrap();
            *session = Some(Session {
                user_id: user_id.clone(),
                notifications,
            });
        }
        self.inner.notify_listeners();
        Ok(self.snapshot())
    }

    /// Persists a new notification. When it belongs to the session's user it
    /// is also cached, announced to listeners and fanned out to the enabled
    /// channels. Notifications for other users persist without local effects.
    pub async fn create(&self, input: NotificationInput) -> Result<Notification, CourierError> {
        let notification = execute(CreateNotificationUseCase { input }, &self.inner.ctx)
            .await
            .map_err(CourierError::from)?;

        if self.inner.insert_cached(&notification) {
            self.inner.notify_listeners();
            self.inner.fan_out(&notification).await;
        }
        Ok(notification)
    }

    /// Entry point for the live change feed. Records of a muted type are
    /// dropped before they touch the cache, the listeners or any sink.
    pub async fn on_remote_insert(&self, notification: Notification) {
        let prefs = self.inner.preferences(&notification.user_id).await;
        if !prefs.type_enabled(notification.notification_type) {
            debug!(
                "Dropping remote notification of muted type {}",
                notification.notification_type
            );
            return;
        }

        if self.inner.insert_cached(&notification) {
            self.inner.notify_listeners();
            self.inner.fan_out_with(&notification, &prefs).await;
        }
    }

    /// Translates a domain event into a notification for `user_id` and runs
    /// it through the creation path. Unknown event types are logged and
    /// ignored.
    pub async fn ingest_event(
        &self,
        user_id: &ID,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Notification>, CourierError> {
        let draft = match courier_domain::translate(event_type, payload) {
            Some(draft) => draft,
            None => {
                warn!("Unknown smart event type: {}", event_type);
                return Ok(None);
            }
        };
        let notification = self.create(draft.for_user(user_id.clone())).await?;
        Ok(Some(notification))
    }

    pub async fn mark_read(&self, notification_id: &ID) -> Result<Notification, CourierError> {
        let notification = execute(
            MarkReadUseCase {
                notification_id: notification_id.clone(),
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        if self.inner.replace_cached(&notification) {
            self.inner.notify_listeners();
        }
        Ok(notification)
    }

    /// Returns the number of notifications that changed state.
    pub async fn mark_all_read(&self, user_id: &ID) -> Result<usize, CourierError> {
        let updated = execute(
            MarkAllReadUseCase {
                user_id: user_id.clone(),
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        let mut changed = false;
        for notification in &updated {
            changed |= self.inner.replace_cached(notification);
        }
        if changed {
            self.inner.notify_listeners();
        }
        Ok(updated.len())
    }

    /// Removes from store and cache. Deleting an unknown id is a no-op.
    pub async fn delete(&self, notification_id: &ID) -> Result<(), CourierError> {
        execute(
            DeleteNotificationUseCase {
                notification_id: notification_id.clone(),
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        if self.inner.remove_cached(notification_id) {
            self.inner.notify_listeners();
        }
        Ok(())
    }

    pub async fn stats(
        &self,
        user_id: &ID,
        window_days: i64,
    ) -> Result<NotificationStats, CourierError> {
        execute(
            NotificationStatsUseCase {
                user_id: user_id.clone(),
                window_days,
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)
    }

    /// Deletes read notifications past the configured retention window.
    /// Returns the number of records removed.
    pub async fn cleanup(&self) -> Result<i64, CourierError> {
        execute(
            CleanupNotificationsUseCase {
                retention_days: self.inner.ctx.config.retention_days,
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)
    }

    /// Registers an observer. Listeners run synchronously on the mutating
    /// call and must hand off their own slow work.
    pub fn subscribe(
        &self,
        listener: impl Fn(&NotificationSnapshot) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.inner.listener_seq.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, listener_id: ListenerId) {
        self.inner
            .listeners
            .lock()
            .unwrap()
            .retain(|(id, _)| *id != listener_id);
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.inner.snapshot()
    }
}

impl DispatcherInner {
    /// Prepends to the cache when the record belongs to the session's user.
    /// Returns whether the cache changed.
    fn insert_cached(&self, notification: &Notification) -> bool {
        let mut session = self.session.lock().unwrap();
        match session.as_mut() {
            Some(session) if session.user_id == notification.user_id => {
                session.notifications.insert(0, notification.clone());
                session
                    .notifications
                    .truncate(self.ctx.config.notification_cache_limit);
                true
            }
            _ => false,
        }
    }

    fn replace_cached(&self, notification: &Notification) -> bool {
        let mut session = self.session.lock().unwrap();
        if let Some(session) = session.as_mut() {
            if let Some(cached) = session
                .notifications
                .iter_mut()
                .find(|n| n.id == notification.id)
            {
                *cached = notification.clone();
                return true;
            }
        }
        false
    }

    fn remove_cached(&self, notification_id: &ID) -> bool {
        let mut session = self.session.lock().unwrap();
        if let Some(session) = session.as_mut() {
            let before = session.notifications.len();
            session.notifications.retain(|n| n.id != *notification_id);
            return session.notifications.len() != before;
        }
        false
    }

    fn snapshot(&self) -> NotificationSnapshot {
        let session = self.session.lock().unwrap();
        match session.as_ref() {
            Some(session) => NotificationSnapshot {
                unread_count: session.notifications.iter().filter(|n| !n.read).count(),
                notifications: session.notifications.clone(),
            },
            None => NotificationSnapshot {
                notifications: Vec::new(),
                unread_count: 0,
            },
        }
    }

    /// Neither lock is held while callbacks run, so a listener may call back
    /// into the dispatcher, including `subscribe` and `unsubscribe`.
    fn notify_listeners(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }

    async fn preferences(&self, user_id: &ID) -> UserPreferences {
        self.ctx
            .repos
            .preferences
            .find(user_id)
            .await
            .unwrap_or_else(|| UserPreferences::new(user_id.clone()))
    }

    async fn fan_out(&self, notification: &Notification) {
        let prefs = self.preferences(&notification.user_id).await;
        self.fan_out_with(notification, &prefs).await;
    }

    /// Every enabled channel is attempted independently. A sink failure is
    /// logged and never rolls back the cache or blocks the other channels.
    async fn fan_out_with(&self, notification: &Notification, prefs: &UserPreferences) {
        let deliveries = self
            .sinks
            .iter()
            .filter(|sink| prefs.allows(sink.channel(), notification.notification_type))
            .map(|sink| async move {
                if let Err(e) = sink.deliver(notification).await {
                    error!("Delivery on channel {:?} failed: {:?}", sink.channel(), e);
                }
            });
        futures::future::join_all(deliveries).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use courier_domain::{Channel, Metadata, NotificationType, Priority};

    struct RecordingSink {
        channel: Channel,
        delivered: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn new(channel: Channel) -> Arc<Self> {
            Arc::new(Self {
                channel,
                delivered: Mutex::new(Vec::new()),
            })
        }

        fn delivered_count(&self) -> usize {
            self.delivered.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl NotificationSink for RecordingSink {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct TestDispatcher {
        ctx: CourierContext,
        dispatcher: NotificationDispatcher,
        push: Arc<RecordingSink>,
        email: Arc<RecordingSink>,
    }

    fn setup() -> TestDispatcher {
        let ctx = CourierContext::create_inmemory();
        let push = RecordingSink::new(Channel::Push);
        let email = RecordingSink::new(Channel::Email);
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![push.clone(), email.clone()];
        let dispatcher = NotificationDispatcher::new(ctx.clone(), sinks);
        TestDispatcher {
            ctx,
            dispatcher,
            push,
            email,
        }
    }

    fn input_factory(user_id: &ID) -> NotificationInput {
        NotificationInput {
            user_id: user_id.clone(),
            title: "New order received".into(),
            message: "Acme placed a new order".into(),
            notification_type: NotificationType::Order,
            priority: Priority::High,
            action_ref: Some("/orders".into()),
            metadata: Metadata::new(),
        }
    }

    #[tokio::test]
    async fn create_for_session_user_caches_and_fans_out() {
        let t = setup();
        let user_id = ID::new();
        t.dispatcher.load(&user_id).await.unwrap();

        t.dispatcher.create(input_factory(&user_id)).await.unwrap();

        let snapshot = t.dispatcher.snapshot();
        assert_eq!(snapshot.notifications.len(), 1);
        assert_eq!(snapshot.unread_count, 1);
        assert_eq!(t.push.delivered_count(), 1);
        assert_eq!(t.email.delivered_count(), 1);
    }

    #[tokio::test]
    async fn create_for_another_user_persists_without_local_effects() {
        let t = setup();
        let session_user = ID::new();
        let other_user = ID::new();
        t.dispatcher.load(&session_user).await.unwrap();

        let created = t.dispatcher.create(input_factory(&other_user)).await.unwrap();

        assert!(t.ctx.repos.notifications.find(&created.id).await.is_some());
        assert_eq!(t.dispatcher.snapshot().notifications.len(), 0);
        assert_eq!(t.push.delivered_count(), 0);
    }

    #[tokio::test]
    async fn disabled_channel_is_skipped_on_fan_out() {
        let t = setup();
        let user_id = ID::new();
        let mut prefs = UserPreferences::new(user_id.clone());
        prefs.channels.email = false;
        t.ctx.repos.preferences.save(&prefs).await.unwrap();
        t.dispatcher.load(&user_id).await.unwrap();

        t.dispatcher.create(input_factory(&user_id)).await.unwrap();

        assert_eq!(t.push.delivered_count(), 1);
        assert_eq!(t.email.delivered_count(), 0);
    }

    #[tokio::test]
    async fn muted_type_on_remote_insert_has_no_effect() {
        let t = setup();
        let user_id = ID::new();
        let mut prefs = UserPreferences::new(user_id.clone());
        prefs.type_toggles.insert(NotificationType::Campaign, false);
        t.ctx.repos.preferences.save(&prefs).await.unwrap();
        t.dispatcher.load(&user_id).await.unwrap();

        let notified = Arc::new(Mutex::new(0));
        let count = notified.clone();
        t.dispatcher.subscribe(move |_| {
            *count.lock().unwrap() += 1;
        });

        let mut input = input_factory(&user_id);
        input.notification_type = NotificationType::Campaign;
        let remote = Notification {
            id: ID::new(),
            user_id: user_id.clone(),
            title: input.title,
            message: input.message,
            notification_type: input.notification_type,
            priority: input.priority,
            read: false,
            read_at: None,
            created_at: 0,
            action_ref: None,
            metadata: Metadata::new(),
        };
        t.dispatcher.on_remote_insert(remote).await;

        assert_eq!(t.dispatcher.snapshot().notifications.len(), 0);
        assert_eq!(t.push.delivered_count(), 0);
        assert_eq!(*notified.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_zeroes_the_unread_count() {
        let t = setup();
        let user_id = ID::new();
        t.dispatcher.load(&user_id).await.unwrap();
        for _ in 0..3 {
            t.dispatcher.create(input_factory(&user_id)).await.unwrap();
        }
        assert_eq!(t.dispatcher.snapshot().unread_count, 3);

        let marked = t.dispatcher.mark_all_read(&user_id).await.unwrap();
        assert_eq!(marked, 3);

        let snapshot = t.dispatcher.snapshot();
        assert_eq!(snapshot.unread_count, 0);
        assert!(snapshot
            .notifications
            .iter()
            .all(|n| n.read && n.read_at.is_some()));
    }

    #[tokio::test]
    async fn double_delete_does_not_double_decrement() {
        let t = setup();
        let user_id = ID::new();
        t.dispatcher.load(&user_id).await.unwrap();
        let kept = t.dispatcher.create(input_factory(&user_id)).await.unwrap();
        let deleted = t.dispatcher.create(input_factory(&user_id)).await.unwrap();

        t.dispatcher.delete(&deleted.id).await.unwrap();
        assert_eq!(t.dispatcher.snapshot().unread_count, 1);

        t.dispatcher.delete(&deleted.id).await.unwrap();
        let snapshot = t.dispatcher.snapshot();
        assert_eq!(snapshot.unread_count, 1);
        assert_eq!(snapshot.notifications[0].id, kept.id);
    }

    #[tokio::test]
    async fn unsubscribed_listener_is_not_called() {
        let t = setup();
        let user_id = ID::new();
        let notified = Arc::new(Mutex::new(0));
        let count = notified.clone();
        let listener_id = t.dispatcher.subscribe(move |_| {
            *count.lock().unwrap() += 1;
        });

        t.dispatcher.load(&user_id).await.unwrap();
        assert_eq!(*notified.lock().unwrap(), 1);

        t.dispatcher.unsubscribe(listener_id);
        t.dispatcher.create(input_factory(&user_id)).await.unwrap();
        assert_eq!(*notified.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn listener_may_mutate_subscriptions_reentrantly() {
        let t = setup();
        let user_id = ID::new();

        let late_calls = Arc::new(Mutex::new(0));
        let count = late_calls.clone();
        let dispatcher = t.dispatcher.clone();
        let outer_id = Arc::new(Mutex::new(None));
        let outer_handle = outer_id.clone();
        let id = t.dispatcher.subscribe(move |_| {
            // Replace ourselves with a counting listener on the first call
            if let Some(own_id) = outer_handle.lock().unwrap().take() {
                dispatcher.unsubscribe(own_id);
                let count = count.clone();
                dispatcher.subscribe(move |_| {
                    *count.lock().unwrap() += 1;
                });
            }
        });
        *outer_id.lock().unwrap() = Some(id);

        t.dispatcher.load(&user_id).await.unwrap();
        assert_eq!(*late_calls.lock().unwrap(), 0);

        t.dispatcher.create(input_factory(&user_id)).await.unwrap();
        assert_eq!(*late_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn ingest_event_runs_through_the_creation_path() {
        let t = setup();
        let user_id = ID::new();
        t.dispatcher.load(&user_id).await.unwrap();

        let created = t
            .dispatcher
            .ingest_event(
                &user_id,
                "new_order",
                &serde_json::json!({ "client_name": "Acme", "total": 500 }),
            )
            .await
            .unwrap()
            .expect("known event type");

        assert_eq!(created.notification_type, NotificationType::Order);
        assert_eq!(t.dispatcher.snapshot().notifications.len(), 1);

        let unknown = t
            .dispatcher
            .ingest_event(&user_id, "coffee_brewed", &serde_json::json!({}))
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn cache_is_bounded_by_the_configured_limit() {
        let t = setup();
        let user_id = ID::new();
        t.dispatcher.load(&user_id).await.unwrap();

        let limit = t.ctx.config.notification_cache_limit;
        for _ in 0..limit + 5 {
            t.dispatcher.create(input_factory(&user_id)).await.unwrap();
        }
        assert_eq!(t.dispatcher.snapshot().notifications.len(), limit);
    }
}
