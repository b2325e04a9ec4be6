use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_infra::CourierContext;

/// Garbage collects read notifications older than the retention window.
#[derive(Debug)]
pub(crate) struct CleanupNotificationsUseCase {
    pub retention_days: i64,
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
impl UseCase for CleanupNotificationsUseCase {
    type Response = i64;
    type Error = UseCaseError;

    const NAME: &'static str = "CleanupNotifications";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let before = ctx.sys.get_timestamp_millis() - self.retention_days * 24 * 60 * 60 * 1000;
        let res = ctx.repos.notifications.delete_read_before(before).await?;
        Ok(res.deleted_count)
    }
}
