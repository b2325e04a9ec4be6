use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Notification, ID};
use courier_infra::CourierContext;

/// The most recent notifications for a user, newest first.
#[derive(Debug)]
pub(crate) struct LoadNotificationsUseCase {
    pub user_id: ID,
    pub limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for LoadNotificationsUseCase {
    type Response = Vec<Notification>;
    type Error = UseCaseError;

    const NAME: &'static str = "LoadNotifications";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx
            .repos
            .notifications
            .find_by_user(&self.user_id, self.limit)
            .await)
    }
}
