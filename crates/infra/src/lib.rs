mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, SinkEndpoint};
pub use repos::{DeleteResult, INotificationRepo, IPreferencesRepo, IReminderRepo, Repos};
pub use services::{
    EmailRelaySink, InAppEventSink, NotificationFeed, NotificationSink, WebhookPushSink,
};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::info;

#[derive(Clone)]
pub struct CourierContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl CourierContext {
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }

    async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(connection_string).await?;
        Ok(Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        })
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> CourierContext {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(connection_string) => CourierContext::create_postgres(&connection_string)
            .await
            .expect("Postgres credentials must be valid"),
        Err(_) => {
            info!(
                "{} not set, falling back to in-memory repositories",
                PSQL_CONNECTION_STRING
            );
            CourierContext::create_inmemory()
        }
    }
}

pub async fn run_migration(connection_string: &str) -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(connection_string)
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
