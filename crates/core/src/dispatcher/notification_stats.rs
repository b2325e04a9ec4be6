use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::{NotificationType, ID};
use courier_infra::CourierContext;
use std::collections::HashMap;

/// Read-only aggregation over a trailing window of days.
#[derive(Debug)]
pub(crate) struct NotificationStatsUseCase {
    pub user_id: ID,
    pub window_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
    pub by_type: HashMap<NotificationType, usize>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for NotificationStatsUseCase {
    type Response = NotificationStats;
    type Error = UseCaseError;

    const NAME: &'static str = "NotificationStats";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        let since = ctx.sys.get_timestamp_millis() - self.window_days * 24 * 60 * 60 * 1000;
        let notifications = ctx
            .repos
            .notifications
            .find_by_user_since(&self.user_id, since)
            .await;

        let mut stats = NotificationStats {
            total: notifications.len(),
            ..Default::default()
        };
        for notification in &notifications {
            if notification.read {
                stats.read += 1;
            } else {
                stats.unread += 1;
            }
            *stats
                .by_type
                .entry(notification.notification_type)
                .or_insert(0) += 1;
        }

        Ok(stats)
    }
}
