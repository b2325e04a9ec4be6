use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Notification, ID};
use courier_infra::CourierContext;

#[derive(Debug)]
pub(crate) struct MarkAllReadUseCase {
    pub user_id: ID,
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
impl UseCase for MarkAllReadUseCase {
    type Response = Vec<Notification>;
    type Error = UseCaseError;

    const NAME: &'static str = "MarkAllRead";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let read_at = ctx.sys.get_timestamp_millis();
        let updated = ctx
            .repos
            .notifications
            .mark_all_read(&self.user_id, read_at)
            .await?;
        Ok(updated)
    }
}
