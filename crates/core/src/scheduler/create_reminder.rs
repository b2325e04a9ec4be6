use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Priority, RecurrencePattern, Reminder, ReminderType, ID};
use courier_infra::CourierContext;

#[derive(Debug, Clone)]
pub struct CreateReminderInput {
    pub owner_id: ID,
    pub client_ref: Option<String>,
    pub title: String,
    pub description: String,
    pub reminder_type: ReminderType,
    pub priority: Priority,
    pub recurrence: RecurrencePattern,
    pub base_date: i64,
    /// When absent the first trigger is derived from `base_date` and the
    /// recurrence pattern
    pub next_trigger: Option<i64>,
}

#[derive(Debug)]
pub(crate) struct CreateReminderUseCase {
    pub input: CreateReminderInput,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {
    #[error("A title is required")]
    EmptyTitle,
    #[error("Storage error")]
    StorageError(#[from] anyhow::Error),
}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyTitle => Self::Validation("A title is required".into()),
            UseCaseError::StorageError(_) => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        if self.input.title.trim().is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }

        let now = ctx.sys.get_timestamp_millis();
        let input = &self.input;
        // Overdue recurring reminders start at their next future occurrence,
        // an overdue one-off keeps its past trigger and fires immediately
        let next_trigger = input
            .next_trigger
            .unwrap_or_else(|| input.recurrence.advance_past(input.base_date, now));

        let reminder = Reminder {
            id: ID::new(),
            owner_id: input.owner_id.clone(),
            client_ref: input.client_ref.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            reminder_type: input.reminder_type,
            priority: input.priority,
            recurrence: input.recurrence,
            base_date: input.base_date,
            next_trigger,
            active: true,
            completed: false,
            notification_sent: false,
            created: now,
            updated: now,
        };
        ctx.repos.reminders.insert(&reminder).await?;

        Ok(reminder)
    }
}
