mod complete_reminder;
mod create_reminder;
mod delete_reminder;
mod reconcile;
mod trigger_reminder;
mod update_reminder;

pub use complete_reminder::CompleteOutcome;
pub use create_reminder::CreateReminderInput;
pub use update_reminder::UpdateReminderPatch;

use crate::dispatcher::NotificationDispatcher;
use crate::error::CourierError;
use crate::shared::usecase::execute;
use crate::timer::{Timer, TimerHandle};
use complete_reminder::CompleteReminderUseCase;
use courier_domain::{Reminder, ID};
use courier_infra::CourierContext;
use create_reminder::CreateReminderUseCase;
use delete_reminder::DeleteReminderUseCase;
use reconcile::ReconcileUseCase;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use trigger_reminder::{TriggerOutcome, TriggerReminderUseCase};
use update_reminder::UpdateReminderUseCase;

/// Owns the in-memory registry of armed timers for due reminders. The store
/// is authoritative, the registry is rebuilt from it by `init` and kept
/// consistent by every mutating operation.
///
/// Constructed once at startup and cloned into whatever needs it.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    ctx: CourierContext,
    dispatcher: NotificationDispatcher,
    timer: Arc<dyn Timer>,
    registry: Mutex<HashMap<ID, TimerHandle>>,
}

impl ReminderScheduler {
    pub fn new(
        ctx: CourierContext,
        dispatcher: NotificationDispatcher,
        timer: Arc<dyn Timer>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ctx,
                dispatcher,
                timer,
                registry: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Rebuilds the registry from the store, arming a timer for every active,
    /// unclaimed reminder due within the lookahead window. Overdue reminders
    /// get a zero delay and fire immediately.
    pub async fn init(&self) -> Result<usize, CourierError> {
        let horizon_millis = self.inner.ctx.sys.get_timestamp_millis()
            + self.inner.ctx.config.lookahead_window_millis;
        let due = execute(ReconcileUseCase { horizon_millis }, &self.inner.ctx)
            .await
            .map_err(CourierError::from)?;

        let count = due.len();
        for reminder in due {
            self.inner.arm(&reminder);
        }
        info!("Reminder scheduler initialized with {} armed timers", count);
        Ok(count)
    }

    /// Cancels every armed timer. The store keeps the schedule, the next
    /// `init` restores it.
    pub fn shutdown(&self) {
        let handles: Vec<TimerHandle> = {
            let mut registry = self.inner.registry.lock().unwrap();
            registry.drain().map(|(_, handle)| handle).collect()
        };
        let count = handles.len();
        for handle in handles {
            handle.cancel();
        }
        info!("Reminder scheduler shut down, {} timers cancelled", count);
    }

    pub async fn create(&self, input: CreateReminderInput) -> Result<Reminder, CourierError> {
        let reminder = execute(CreateReminderUseCase { input }, &self.inner.ctx)
            .await
            .map_err(CourierError::from)?;
        self.inner.arm(&reminder);
        Ok(reminder)
    }

    pub async fn update(
        &self,
        reminder_id: &ID,
        patch: UpdateReminderPatch,
    ) -> Result<Reminder, CourierError> {
        let reminder = execute(
            UpdateReminderUseCase {
                reminder_id: reminder_id.clone(),
                patch,
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        self.inner.disarm(reminder_id);
        self.inner.arm(&reminder);
        Ok(reminder)
    }

    /// Marks the current occurrence as done. Recurring reminders advance to
    /// their next occurrence and stay armed, one-off reminders deactivate.
    pub async fn complete(&self, reminder_id: &ID) -> Result<CompleteOutcome, CourierError> {
        let outcome = execute(
            CompleteReminderUseCase {
                reminder_id: reminder_id.clone(),
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        self.inner.disarm(reminder_id);
        if let CompleteOutcome::Rearmed(reminder) = &outcome {
            self.inner.arm(reminder);
        }
        Ok(outcome)
    }

    /// Removes the reminder from store and registry. Deleting an unknown id
    /// is a no-op.
    pub async fn delete(&self, reminder_id: &ID) -> Result<(), CourierError> {
        execute(
            DeleteReminderUseCase {
                reminder_id: reminder_id.clone(),
            },
            &self.inner.ctx,
        )
        .await
        .map_err(CourierError::from)?;

        self.inner.disarm(reminder_id);
        Ok(())
    }

    /// Safety net for timers lost to a crash, a missed arm or clock drift.
    /// Triggers every due, unclaimed reminder through the same idempotent
    /// path as timer expiry. Returns the number of reminders fired.
    pub async fn sweep(&self) -> Result<usize, CourierError> {
        let horizon_millis = self.inner.ctx.sys.get_timestamp_millis();
        let due = execute(ReconcileUseCase { horizon_millis }, &self.inner.ctx)
            .await
            .map_err(CourierError::from)?;

        let mut fired = 0;
        for reminder in due {
            // A live timer may still be armed for this occurrence
            self.inner.disarm(&reminder.id);
            if self.inner.clone().trigger(reminder.id).await {
                fired += 1;
            }
        }
        if fired > 0 {
            info!("Sweep fired {} missed reminders", fired);
        }
        Ok(fired)
    }
}

impl SchedulerInner {
    fn arm(self: &Arc<Self>, reminder: &Reminder) {
        if !reminder.active || reminder.notification_sent {
            return;
        }

        let now = self.ctx.sys.get_timestamp_millis();
        let delay_millis = (reminder.next_trigger - now).max(0) as u64;
        let inner = self.clone();
        let callback_id = reminder.id.clone();
        let handle = self.timer.arm(
            Duration::from_millis(delay_millis),
            Box::pin(async move {
                inner.trigger(callback_id).await;
            }),
        );

        let previous = self
            .registry
            .lock()
            .unwrap()
            .insert(reminder.id.clone(), handle);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    fn disarm(&self, reminder_id: &ID) {
        let handle = self.registry.lock().unwrap().remove(reminder_id);
        if let Some(handle) = handle {
            handle.cancel();
        }
    }

    async fn trigger(self: Arc<Self>, reminder_id: ID) -> bool {
        // Drop the fired handle without cancelling, the callback owning it
        // may be the one running right now
        drop(self.registry.lock().unwrap().remove(&reminder_id));

        let outcome = match execute(
            TriggerReminderUseCase {
                reminder_id: reminder_id.clone(),
            },
            &self.ctx,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Trigger for reminder {} failed: {:?}", reminder_id, e);
                return false;
            }
        };

        match outcome {
            TriggerOutcome::Fired {
                notification,
                rearmed,
            } => {
                if let Err(e) = self.dispatcher.create(notification).await {
                    warn!(
                        "Dispatch of notification for reminder {} failed: {:?}",
                        reminder_id, e
                    );
                }
                if let Some(reminder) = rearmed {
                    self.arm(&reminder);
                }
                true
            }
            TriggerOutcome::AlreadyHandled => false,
        }
    }
}
