mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;

use courier_domain::{Reminder, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_by_owner(&self, owner_id: &ID) -> Vec<Reminder>;
    /// Active reminders whose current occurrence has not been dispatched and
    /// is due before `before`. Serves both startup reconciliation (with a
    /// lookahead horizon) and the periodic sweep (with `now`).
    async fn find_unsent_before(&self, before: i64) -> Vec<Reminder>;
    /// Conditionally flips `notification_sent` from false to true. Returns
    /// false when the occurrence was already claimed, which callers must
    /// treat as "already handled", not as a failure.
    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<bool>;
    async fn delete(&self, reminder_id: &ID) -> Option<Reminder>;
}
