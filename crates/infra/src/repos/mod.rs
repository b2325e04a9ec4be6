mod notification;
mod preferences;
mod reminder;
mod shared;

use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
use preferences::{InMemoryPreferencesRepo, PostgresPreferencesRepo};
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

pub use notification::INotificationRepo;
pub use preferences::IPreferencesRepo;
pub use reminder::IReminderRepo;
pub use shared::DeleteResult;

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
    pub preferences: Arc<dyn IPreferencesRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            preferences: Arc::new(PostgresPreferencesRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            preferences: Arc::new(InMemoryPreferencesRepo::new()),
        }
    }
}
