use courier_core::{
    CreateReminderInput, ManualTimer, NotificationDispatcher, NotificationSnapshot,
    ReminderScheduler,
};
use courier_domain::{
    Channel, Notification, Priority, RecurrencePattern, ReminderType, UserPreferences, ID,
};
use courier_infra::{CourierContext, ISys, NotificationSink};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

const MINUTE_MILLIS: i64 = 60 * 1000;
const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

struct StaticTimeSys {
    now: AtomicI64,
}

impl StaticTimeSys {
    fn new(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

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

    fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
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

struct TestApp {
    ctx: CourierContext,
    sys: Arc<StaticTimeSys>,
    timer: Arc<ManualTimer>,
    scheduler: ReminderScheduler,
    dispatcher: NotificationDispatcher,
    push: Arc<RecordingSink>,
    email: Arc<RecordingSink>,
    snapshots: Arc<Mutex<Vec<NotificationSnapshot>>>,
}

fn setup() -> TestApp {
    let sys = StaticTimeSys::new(1_700_000_000_000);
    let mut ctx = CourierContext::create_inmemory();
    ctx.sys = sys.clone();

    let push = RecordingSink::new(Channel::Push);
    let email = RecordingSink::new(Channel::Email);
    let sinks: Vec<Arc<dyn NotificationSink>> = vec![push.clone(), email.clone()];
    let dispatcher = NotificationDispatcher::new(ctx.clone(), sinks);

    let timer = Arc::new(ManualTimer::new());
    let scheduler = ReminderScheduler::new(ctx.clone(), dispatcher.clone(), timer.clone());

    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let recorded = snapshots.clone();
    dispatcher.subscribe(move |snapshot| {
        recorded.lock().unwrap().push(snapshot.clone());
    });

    TestApp {
        ctx,
        sys,
        timer,
        scheduler,
        dispatcher,
        push,
        email,
        snapshots,
    }
}

fn reminder_input(app: &TestApp, owner_id: &ID, recurrence: RecurrencePattern) -> CreateReminderInput {
    CreateReminderInput {
        owner_id: owner_id.clone(),
        client_ref: None,
        title: "Call Acme".into(),
        description: "Discuss the renewal terms".into(),
        reminder_type: ReminderType::Call,
        priority: Priority::High,
        recurrence,
        base_date: app.sys.get_timestamp_millis() - 5 * MINUTE_MILLIS,
        next_trigger: Some(app.sys.get_timestamp_millis() - 5 * MINUTE_MILLIS),
    }
}

#[tokio::test]
async fn overdue_one_off_fires_once_and_reaches_every_enabled_channel() {
    let app = setup();
    let owner_id = ID::new();
    app.dispatcher.load(&owner_id).await.unwrap();

    let reminder = app
        .scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Once))
        .await
        .unwrap();

    app.timer.fire_all().await;

    let stored = app.ctx.repos.reminders.find(&reminder.id).await.unwrap();
    assert!(!stored.active);
    assert!(stored.completed);

    let snapshot = app.dispatcher.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.unread_count, 1);
    let notification = &snapshot.notifications[0];
    assert_eq!(
        notification.metadata.get("reminder_id"),
        Some(&reminder.id.as_string())
    );
    assert_eq!(app.push.delivered().len(), 1);
    assert_eq!(app.email.delivered().len(), 1);

    // A later sweep finds nothing left to fire
    assert_eq!(app.scheduler.sweep().await.unwrap(), 0);
    assert_eq!(app.dispatcher.snapshot().notifications.len(), 1);
}

#[tokio::test]
async fn weekly_reminder_advances_exactly_seven_days_per_fire() {
    let app = setup();
    let owner_id = ID::new();

    let reminder = app
        .scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Weekly))
        .await
        .unwrap();
    let first_trigger = reminder.next_trigger;

    app.timer.fire_all().await;

    let stored = app.ctx.repos.reminders.find(&reminder.id).await.unwrap();
    assert_eq!(stored.next_trigger, first_trigger + WEEK_MILLIS);
    assert!(!stored.notification_sent);
    assert!(stored.active);
    assert_eq!(app.timer.armed_count(), 1, "next occurrence is armed");

    // A week later the next occurrence fires and advances again
    app.sys.advance(WEEK_MILLIS);
    app.timer.fire_all().await;

    let stored = app.ctx.repos.reminders.find(&reminder.id).await.unwrap();
    assert_eq!(stored.next_trigger, first_trigger + 2 * WEEK_MILLIS);
}

#[tokio::test]
async fn sweep_and_stale_timer_produce_a_single_notification() {
    let app = setup();
    let owner_id = ID::new();
    app.dispatcher.load(&owner_id).await.unwrap();

    app.scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Once))
        .await
        .unwrap();

    // The sweep wins the race, the armed timer fires afterwards
    assert_eq!(app.scheduler.sweep().await.unwrap(), 1);
    app.timer.fire_all().await;

    let notifications = app
        .ctx
        .repos
        .notifications
        .find_by_user(&owner_id, 10)
        .await;
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn restart_reconciliation_rearms_and_fires_overdue_reminders() {
    let app = setup();
    let owner_id = ID::new();
    app.dispatcher.load(&owner_id).await.unwrap();

    let reminder = app
        .scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Once))
        .await
        .unwrap();

    // Simulated crash: timers are gone, the store still has the schedule
    app.scheduler.shutdown();
    app.timer.fire_all().await;
    assert_eq!(app.dispatcher.snapshot().notifications.len(), 0);

    let armed = app.scheduler.init().await.unwrap();
    assert_eq!(armed, 1);
    app.timer.fire_all().await;

    let snapshot = app.dispatcher.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(
        snapshot.notifications[0].metadata.get("reminder_id"),
        Some(&reminder.id.as_string())
    );
}

#[tokio::test]
async fn listener_receives_a_snapshot_for_every_mutation() {
    let app = setup();
    let owner_id = ID::new();
    app.dispatcher.load(&owner_id).await.unwrap();

    app.scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Once))
        .await
        .unwrap();
    app.timer.fire_all().await;

    let notification_id = app.dispatcher.snapshot().notifications[0].id.clone();
    app.dispatcher.mark_read(&notification_id).await.unwrap();
    app.dispatcher.delete(&notification_id).await.unwrap();

    let snapshots = app.snapshots.lock().unwrap();
    // load, create, mark_read, delete
    assert_eq!(snapshots.len(), 4);
    assert_eq!(snapshots[1].unread_count, 1);
    assert_eq!(snapshots[2].unread_count, 0);
    assert!(snapshots[3].notifications.is_empty());
}

#[tokio::test]
async fn muted_type_never_reaches_channels_even_when_due() {
    let app = setup();
    let owner_id = ID::new();
    let mut prefs = UserPreferences::new(owner_id.clone());
    prefs.channels.email = false;
    app.ctx.repos.preferences.save(&prefs).await.unwrap();
    app.dispatcher.load(&owner_id).await.unwrap();

    app.scheduler
        .create(reminder_input(&app, &owner_id, RecurrencePattern::Once))
        .await
        .unwrap();
    app.timer.fire_all().await;

    // Persisted and cached, but only the enabled channel delivered
    assert_eq!(app.dispatcher.snapshot().notifications.len(), 1);
    assert_eq!(app.push.delivered().len(), 1);
    assert!(app.email.delivered().is_empty());
}
