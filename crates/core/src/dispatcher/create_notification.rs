use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Notification, NotificationInput, ID};
use courier_infra::CourierContext;

/// Assigns identity and timestamps and persists the record. Cache, listener
/// and channel concerns stay with the dispatcher.
#[derive(Debug)]
pub(crate) struct CreateNotificationUseCase {
    pub input: NotificationInput,
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
impl UseCase for CreateNotificationUseCase {
    type Response = Notification;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateNotification";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        if self.input.title.trim().is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }

        let input = &self.input;
        let notification = Notification {
            id: ID::new(),
            user_id: input.user_id.clone(),
            title: input.title.clone(),
            message: input.message.clone(),
            notification_type: input.notification_type,
            priority: input.priority,
            read: false,
            read_at: None,
            created_at: ctx.sys.get_timestamp_millis(),
            action_ref: input.action_ref.clone(),
            metadata: input.metadata.clone(),
        };
        ctx.repos.notifications.insert(&notification).await?;

        Ok(notification)
    }
}
