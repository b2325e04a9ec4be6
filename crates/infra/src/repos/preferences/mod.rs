mod inmemory;
mod postgres;

pub use inmemory::InMemoryPreferencesRepo;
pub use postgres::PostgresPreferencesRepo;

use courier_domain::{UserPreferences, ID};

#[async_trait::async_trait]
pub trait IPreferencesRepo: Send + Sync {
    async fn find(&self, user_id: &ID) -> Option<UserPreferences>;
    /// Upserts the user's preferences
    async fn save(&self, preferences: &UserPreferences) -> anyhow::Result<()>;
}
