use crate::dispatcher::NotificationDispatcher;
use crate::scheduler::ReminderScheduler;
use std::time::Duration;
use tracing::{error, info};

/// Millis until the next whole interval boundary, so every run lands on a
/// predictable wall-clock tick regardless of when the process started.
fn interval_start_delay(interval_millis: i64, now_millis: i64) -> i64 {
    interval_millis - now_millis % interval_millis
}

/// Spawns the periodic sweep that fires reminders missed by live timers.
/// A failed cycle is logged and the loop continues on the next tick.
pub fn start_sweep_job(scheduler: ReminderScheduler, interval: Duration, now_millis: i64) {
    tokio::spawn(async move {
        let delay = interval_start_delay(interval.as_millis() as i64, now_millis);
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;

        info!("Starting reminder sweep job");
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = scheduler.sweep().await {
                error!("Reminder sweep cycle failed: {:?}", e);
            }
        }
    });
}

/// Spawns the coarse-grained garbage collection of old read notifications.
pub fn start_cleanup_job(dispatcher: NotificationDispatcher, interval: Duration, now_millis: i64) {
    tokio::spawn(async move {
        let delay = interval_start_delay(interval.as_millis() as i64, now_millis);
        tokio::time::sleep(Duration::from_millis(delay as u64)).await;

        info!("Starting notification cleanup job");
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match dispatcher.cleanup().await {
                Ok(deleted) if deleted > 0 => {
                    info!("Cleanup removed {} read notifications", deleted)
                }
                Ok(_) => {}
                Err(e) => error!("Notification cleanup cycle failed: {:?}", e),
            }
        }
    });
}
