use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Priority, RecurrencePattern, Reminder, ReminderType, ID};
use courier_infra::CourierContext;

/// Fields left as `None` keep their current value. `client_ref` is doubly
/// optional so a patch can clear it.
#[derive(Debug, Clone, Default)]
pub struct UpdateReminderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_ref: Option<Option<String>>,
    pub reminder_type: Option<ReminderType>,
    pub priority: Option<Priority>,
    pub recurrence: Option<RecurrencePattern>,
    pub base_date: Option<i64>,
    pub next_trigger: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug)]
pub(crate) struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub patch: UpdateReminderPatch,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {
    #[error("A title is required")]
    EmptyTitle,
    #[error("Reminder not found: {0}")]
    NotFound(ID),
    #[error("Storage error")]
    StorageError(#[from] anyhow::Error),
}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyTitle => Self::Validation("A title is required".into()),
            UseCaseError::NotFound(id) => Self::NotFound(format!("Reminder with id: {}", id)),
            UseCaseError::StorageError(_) => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;

        let patch = &self.patch;
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(UseCaseError::EmptyTitle);
            }
            reminder.title = title.clone();
        }
        if let Some(description) = &patch.description {
            reminder.description = description.clone();
        }
        if let Some(client_ref) = &patch.client_ref {
            reminder.client_ref = client_ref.clone();
        }
        if let Some(reminder_type) = patch.reminder_type {
            reminder.reminder_type = reminder_type;
        }
        if let Some(priority) = patch.priority {
            reminder.priority = priority;
        }
        if let Some(active) = patch.active {
            reminder.active = active;
        }

        let schedule_changed = patch.recurrence.is_some() || patch.base_date.is_some();
        if let Some(recurrence) = patch.recurrence {
            reminder.recurrence = recurrence;
        }
        if let Some(base_date) = patch.base_date {
            reminder.base_date = base_date;
        }

        let now = ctx.sys.get_timestamp_millis();
        if let Some(next_trigger) = patch.next_trigger {
            reminder.next_trigger = next_trigger;
            reminder.notification_sent = false;
        } else if schedule_changed {
            reminder.next_trigger = reminder.recurrence.advance_past(reminder.base_date, now);
            reminder.notification_sent = false;
        }

        reminder.updated = now;
        ctx.repos.reminders.save(&reminder).await?;

        Ok(reminder)
    }
}
