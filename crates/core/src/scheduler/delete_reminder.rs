use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Reminder, ID};
use courier_infra::CourierContext;
use tracing::debug;

#[derive(Debug)]
pub(crate) struct DeleteReminderUseCase {
    pub reminder_id: ID,
}

/// Deleting an absent reminder is a no-op, so there is nothing to fail with.
#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for DeleteReminderUseCase {
    type Response = Option<Reminder>;
    type Error = UseCaseError;

    const NAME: &'static str = "DeleteReminder";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let deleted = ctx.repos.reminders.delete(&self.reminder_id).await;
        if deleted.is_none() {
            debug!("Reminder {} was already deleted", self.reminder_id);
        }
        Ok(deleted)
    }
}
