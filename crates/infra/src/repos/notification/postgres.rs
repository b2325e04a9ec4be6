use super::INotificationRepo;
use crate::repos::shared::DeleteResult;
use courier_domain::{Metadata, Notification, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    user_uid: Uuid,
    title: String,
    message: String,
    notification_type: String,
    priority: String,
    is_read: bool,
    read_at: Option<i64>,
    created_at: i64,
    action_ref: Option<String>,
    metadata: Json<Metadata>,
}

impl TryFrom<NotificationRaw> for Notification {
    type Error = anyhow::Error;

    fn try_from(raw: NotificationRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.notification_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            message: raw.message,
            notification_type: raw.notification_type.parse()?,
            priority: raw.priority.parse()?,
            read: raw.is_read,
            read_at: raw.read_at,
            created_at: raw.created_at,
            action_ref: raw.action_ref,
            metadata: raw.metadata.0,
        })
    }
}

fn into_notifications(raws: Vec<NotificationRaw>) -> Vec<Notification> {
    raws.into_iter()
        .filter_map(|raw| match raw.try_into() {
            Ok(notification) => Some(notification),
            Err(e) => {
                error!("Unable to parse notification row: {:?}", e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, user_uid, title, message, notification_type,
             priority, is_read, read_at, created_at, action_ref, metadata)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.priority.as_str())
        .bind(notification.read)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .bind(&notification.action_ref)
        .bind(Json(&notification.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications SET
                title = $2, message = $3, notification_type = $4, priority = $5,
                is_read = $6, read_at = $7, action_ref = $8, metadata = $9
            WHERE notification_uid = $1
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.priority.as_str())
        .bind(notification.read)
        .bind(notification.read_at)
        .bind(&notification.action_ref)
        .bind(Json(&notification.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            WHERE notification_uid = $1
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()?;
        raw.try_into().ok()
    }

    async fn find_by_user(&self, user_id: &ID, limit: usize) -> Vec<Notification> {
        let raws = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            WHERE user_uid = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();
        into_notifications(raws)
    }

    async fn find_by_user_since(&self, user_id: &ID, since: i64) -> Vec<Notification> {
        let raws = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            WHERE user_uid = $1 AND created_at >= $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();
        into_notifications(raws)
    }

    async fn mark_all_read(&self, user_id: &ID, read_at: i64) -> anyhow::Result<Vec<Notification>> {
        let raws = sqlx::query_as::<_, NotificationRaw>(
            r#"
            UPDATE notifications SET is_read = TRUE, read_at = $2
            WHERE user_uid = $1 AND NOT is_read
            RETURNING *
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(read_at)
        .fetch_all(&self.pool)
        .await?;
        Ok(into_notifications(raws))
    }

    async fn delete(&self, notification_id: &ID) -> Option<Notification> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            DELETE FROM notifications
            WHERE notification_uid = $1
            RETURNING *
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()?;
        raw.try_into().ok()
    }

    async fn delete_read_before(&self, before: i64) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE is_read AND created_at <= $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
