mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

use crate::repos::shared::DeleteResult;
use courier_domain::{Notification, ID};

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn save(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn find(&self, notification_id: &ID) -> Option<Notification>;
    /// The user's most recent notifications, newest first
    async fn find_by_user(&self, user_id: &ID, limit: usize) -> Vec<Notification>;
    async fn find_by_user_since(&self, user_id: &ID, since: i64) -> Vec<Notification>;
    /// Marks every unread notification of the user as read and returns the
    /// updated records
    async fn mark_all_read(&self, user_id: &ID, read_at: i64) -> anyhow::Result<Vec<Notification>>;
    async fn delete(&self, notification_id: &ID) -> Option<Notification>;
    /// Garbage collection of read notifications past the retention window
    async fn delete_read_before(&self, before: i64) -> anyhow::Result<DeleteResult>;
}
