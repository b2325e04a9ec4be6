use super::IPreferencesRepo;
use courier_domain::{ChannelToggles, NotificationType, UserPreferences, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::collections::HashMap;

pub struct PostgresPreferencesRepo {
    pool: PgPool,
}

impl PostgresPreferencesRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PreferencesRaw {
    user_uid: Uuid,
    in_app: bool,
    push: bool,
    email: bool,
    type_toggles: Json<HashMap<NotificationType, bool>>,
}

impl From<PreferencesRaw> for UserPreferences {
    fn from(raw: PreferencesRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            channels: ChannelToggles {
                in_app: raw.in_app,
                push: raw.push,
                email: raw.email,
            },
            type_toggles: raw.type_toggles.0,
        }
    }
}

#[async_trait::async_trait]
impl IPreferencesRepo for PostgresPreferencesRepo {
    async fn find(&self, user_id: &ID) -> Option<UserPreferences> {
        sqlx::query_as::<_, PreferencesRaw>(
            r#"
            SELECT * FROM user_preferences
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }

    async fn save(&self, preferences: &UserPreferences) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences
            (user_uid, in_app, push, email, type_toggles)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (user_uid) DO UPDATE SET
                in_app = $2, push = $3, email = $4, type_toggles = $5
            "#,
        )
        .bind(preferences.user_id.inner_ref())
        .bind(preferences.channels.in_app)
        .bind(preferences.channels.push)
        .bind(preferences.channels.email)
        .bind(Json(&preferences.type_toggles))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
