use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{Notification, ID};
use courier_infra::CourierContext;

#[derive(Debug)]
pub(crate) struct MarkReadUseCase {
    pub notification_id: ID,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {
    #[error("Notification not found: {0}")]
    NotFound(ID),
    #[error("Storage error")]
    StorageError(#[from] anyhow::Error),
}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => Self::NotFound(format!("Notification with id: {}", id)),
            UseCaseError::StorageError(_) => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for MarkReadUseCase {
    type Response = Notification;
    type Error = UseCaseError;

    const NAME: &'static str = "MarkRead";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let mut notification = ctx
            .repos
            .notifications
            .find(&self.notification_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.notification_id.clone()))?;

        // Marking an already read notification succeeds without another write
        if notification.read {
            return Ok(notification);
        }

        notification.read = true;
        notification.read_at = Some(ctx.sys.get_timestamp_millis());
        ctx.repos.notifications.save(&notification).await?;

        Ok(notification)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use courier_domain::{NotificationType, Priority};

    fn notification_factory(user_id: ID) -> Notification {
        Notification {
            id: ID::new(),
            user_id,
            title: "New order received".into(),
            message: "Acme placed a new order".into(),
            notification_type: NotificationType::Order,
            priority: Priority::High,
            read: false,
            read_at: None,
            created_at: 0,
            action_ref: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn marks_read_and_is_idempotent() {
        let ctx = CourierContext::create_inmemory();
        let notification = notification_factory(ID::new());
        ctx.repos.notifications.insert(&notification).await.unwrap();

        let first = execute(
            MarkReadUseCase {
                notification_id: notification.id.clone(),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert!(first.read);
        let read_at = first.read_at.expect("read_at should be set");

        let second = execute(
            MarkReadUseCase {
                notification_id: notification.id,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(second.read_at, Some(read_at));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let ctx = CourierContext::create_inmemory();
        let res = execute(
            MarkReadUseCase {
                notification_id: ID::new(),
            },
            &ctx,
        )
        .await;
        assert!(matches!(res, Err(UseCaseError::NotFound(_))));
    }
}
