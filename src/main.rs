mod telemetry;

use courier_core::{
    start_cleanup_job, start_sweep_job, NotificationDispatcher, ReminderScheduler, TokioTimer,
};
use courier_infra::{
    setup_context, EmailRelaySink, InAppEventSink, NotificationFeed, NotificationSink,
    WebhookPushSink,
};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{get_subscriber, init_subscriber};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

const FEED_CAPACITY: usize = 64;
const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() {
    let subscriber = get_subscriber("courier".into(), "info".into());
    init_subscriber(subscriber);

    if let Ok(connection_string) = std::env::var("DATABASE_URL") {
        courier_infra::run_migration(&connection_string)
            .await
            .expect("migrations to apply cleanly");
    }
    let context = setup_context().await;

    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(InAppEventSink::new(FEED_CAPACITY))];
    if let Some(endpoint) = &context.config.push_webhook {
        sinks.push(Arc::new(WebhookPushSink::new(
            endpoint.url.clone(),
            endpoint.key.clone(),
        )));
    }
    if let Some(endpoint) = &context.config.email_relay {
        sinks.push(Arc::new(EmailRelaySink::new(
            endpoint.url.clone(),
            endpoint.key.clone(),
        )));
    }

    let dispatcher = NotificationDispatcher::new(context.clone(), sinks);
    let scheduler = ReminderScheduler::new(
        context.clone(),
        dispatcher.clone(),
        Arc::new(TokioTimer),
    );

    if let Err(e) = scheduler.init().await {
        error!("Startup reconciliation failed, the sweep will catch up: {:?}", e);
    }

    let now = context.sys.get_timestamp_millis();
    start_sweep_job(
        scheduler.clone(),
        Duration::from_secs(context.config.sweep_interval_secs),
        now,
    );
    start_cleanup_job(dispatcher.clone(), CLEANUP_INTERVAL, now);

    // Notifications inserted by other producers arrive over the feed and run
    // through the dispatcher like locally created ones
    let feed = NotificationFeed::new(FEED_CAPACITY);
    let mut feed_rx = feed.subscribe();
    let feed_dispatcher = dispatcher.clone();
    tokio::spawn(async move {
        loop {
            match feed_rx.recv().await {
                Ok(notification) => feed_dispatcher.on_remote_insert(notification).await,
                Err(RecvError::Lagged(missed)) => {
                    error!("Notification feed lagged, {} records skipped", missed)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("Courier is running");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
    }

    scheduler.shutdown();
    info!("Courier stopped");
}
