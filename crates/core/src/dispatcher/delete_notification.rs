use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Notification, ID};
use courier_infra::CourierContext;
use tracing::debug;

#[derive(Debug)]
pub(crate) struct DeleteNotificationUseCase {
    pub notification_id: ID,
}

/// Deleting an absent notification is a no-op, so there is nothing to fail
/// with.
#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for DeleteNotificationUseCase {
    type Response = Option<Notification>;
    type Error = UseCaseError;

    const NAME: &'static str = "DeleteNotification";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let deleted = ctx.repos.notifications.delete(&self.notification_id).await;
        if deleted.is_none() {
            debug!("Notification {} was already deleted", self.notification_id);
        }
        Ok(deleted)
    }
}
