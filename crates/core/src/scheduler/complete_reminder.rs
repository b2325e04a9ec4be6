use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Reminder, ID};
use courier_infra::CourierContext;

/// What completing a reminder did to its schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    /// Recurring reminder advanced to its next occurrence
    Rearmed(Reminder),
    /// One-off reminder deactivated
    Deactivated(Reminder),
}

#[derive(Debug)]
pub(crate) struct CompleteReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {
    #[error("Reminder not found: {0}")]
    NotFound(ID),
    #[error("Storage error")]
    StorageError(#[from] anyhow::Error),
}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => Self::NotFound(format!("Reminder with id: {}", id)),
            UseCaseError::StorageError(_) => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CompleteReminderUseCase {
    type Response = CompleteOutcome;
    type Error = UseCaseError;

    const NAME: &'static str = "CompleteReminder";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;

        let now = ctx.sys.get_timestamp_millis();
        reminder.updated = now;

        if reminder.recurrence.is_recurring() {
            // Completing the current occurrence schedules the next one
            // relative to now, not to the original trigger time
            reminder.next_trigger = reminder.recurrence.next_occurrence(now);
            reminder.notification_sent = false;
            ctx.repos.reminders.save(&reminder).await?;
            Ok(CompleteOutcome::Rearmed(reminder))
        } else {
            reminder.active = false;
            reminder.completed = true;
            ctx.repos.reminders.save(&reminder).await?;
            Ok(CompleteOutcome::Deactivated(reminder))
        }
    }
}
