use super::INotificationRepo;
use crate::repos::shared::inmemory::{delete, delete_by, find, find_by, insert, save};
use crate::repos::shared::DeleteResult;
use courier_domain::{Notification, ID};
use std::sync::Mutex;

pub struct InMemoryNotificationRepo {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        save(notification, &self.notifications);
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        find(notification_id, &self.notifications)
    }

    async fn find_by_user(&self, user_id: &ID, limit: usize) -> Vec<Notification> {
        let mut found = find_by(&self.notifications, |n: &Notification| {
            n.user_id == *user_id
        });
        found.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        found.truncate(limit);
        found
    }

    async fn find_by_user_since(&self, user_id: &ID, since: i64) -> Vec<Notification> {
        let mut found = find_by(&self.notifications, |n: &Notification| {
            n.user_id == *user_id && n.created_at >= since
        });
        found.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        found
    }

    async fn mark_all_read(&self, user_id: &ID, read_at: i64) -> anyhow::Result<Vec<Notification>> {
        let mut notifications = self.notifications.lock().unwrap();
        let mut updated = Vec::new();
        for notification in notifications.iter_mut() {
            if notification.user_id == *user_id && !notification.read {
                notification.read = true;
                notification.read_at = Some(read_at);
                updated.push(notification.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, notification_id: &ID) -> Option<Notification> {
        delete(notification_id, &self.notifications)
    }

    async fn delete_read_before(&self, before: i64) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.notifications, |n: &Notification| {
            n.read && n.created_at <= before
        }))
    }
}
