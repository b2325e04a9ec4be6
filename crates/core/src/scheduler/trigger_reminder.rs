use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Metadata, NotificationInput, Reminder, ID};
use courier_infra::CourierContext;

/// A timer armed before an occurrence advanced may still fire for the old due
/// time. Anything due more than this far in the future is treated as stale.
pub(crate) const TRIGGER_TOLERANCE_MILLIS: i64 = 1000;

/// Shared trigger path for timer expiry and the sweep. The conditional
/// `mark_sent` write at the store is the idempotency guard, losing that race
/// is the expected outcome for one of two concurrent claimers.
#[derive(Debug)]
pub(crate) struct TriggerReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug)]
pub(crate) enum TriggerOutcome {
    Fired {
        notification: NotificationInput,
        /// The advanced reminder when the pattern recurs
        rearmed: Option<Reminder>,
    },
    /// Claimed by a concurrent trigger, deleted, deactivated or not yet due
    AlreadyHandled,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {
    #[error("Storage error")]
    StorageError(#[from] anyhow::Error),
}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(_) => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for TriggerReminderUseCase {
    type Response = TriggerOutcome;
    type Error = UseCaseError;

    const NAME: &'static str = "TriggerReminder";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let reminder = match ctx.repos.reminders.find(&self.reminder_id).await {
            Some(reminder) => reminder,
            None => return Ok(TriggerOutcome::AlreadyHandled),
        };

        let now = ctx.sys.get_timestamp_millis();
        if !reminder.active || reminder.notification_sent {
            return Ok(TriggerOutcome::AlreadyHandled);
        }
        if reminder.next_trigger > now + TRIGGER_TOLERANCE_MILLIS {
            return Ok(TriggerOutcome::AlreadyHandled);
        }
        if !ctx.repos.reminders.mark_sent(&reminder.id).await? {
            return Ok(TriggerOutcome::AlreadyHandled);
        }

        let mut metadata = Metadata::new();
        metadata.insert("reminder_id".to_string(), reminder.id.as_string());
        let notification = NotificationInput {
            user_id: reminder.owner_id.clone(),
            title: reminder.title.clone(),
            message: reminder.description.clone(),
            notification_type: reminder.reminder_type.into(),
            priority: reminder.priority,
            action_ref: Some(format!("/reminders/{}", reminder.id)),
            metadata,
        };

        let mut updated = reminder;
        updated.updated = now;
        let rearmed = if updated.recurrence.is_recurring() {
            updated.next_trigger = updated.recurrence.next_occurrence(updated.next_trigger);
            updated.notification_sent = false;
            ctx.repos.reminders.save(&updated).await?;
            Some(updated)
        } else {
            updated.active = false;
            updated.completed = true;
            ctx.repos.reminders.save(&updated).await?;
            None
        };

        Ok(TriggerOutcome::Fired {
            notification,
            rearmed,
        })
    }
}
