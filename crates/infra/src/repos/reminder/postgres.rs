use super::IReminderRepo;
use courier_domain::{Reminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    owner_uid: Uuid,
    client_ref: Option<String>,
    title: String,
    description: String,
    reminder_type: String,
    priority: String,
    recurrence: String,
    base_date: i64,
    next_trigger: i64,
    active: bool,
    completed: bool,
    notification_sent: bool,
    created: i64,
    updated: i64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(raw: ReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.reminder_uid.into(),
            owner_id: raw.owner_uid.into(),
            client_ref: raw.client_ref,
            title: raw.title,
            description: raw.description,
            reminder_type: raw.reminder_type.parse()?,
            priority: raw.priority.parse()?,
            recurrence: raw.recurrence.parse()?,
            base_date: raw.base_date,
            next_trigger: raw.next_trigger,
            active: raw.active,
            completed: raw.completed,
            notification_sent: raw.notification_sent,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_reminders(raws: Vec<ReminderRaw>) -> Vec<Reminder> {
    raws.into_iter()
        .filter_map(|raw| match raw.try_into() {
            Ok(reminder) => Some(reminder),
            Err(e) => {
                error!("Unable to parse reminder row: {:?}", e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, owner_uid, client_ref, title, description, reminder_type,
             priority, recurrence, base_date, next_trigger, active, completed,
             notification_sent, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.owner_id.inner_ref())
        .bind(&reminder.client_ref)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.priority.as_str())
        .bind(reminder.recurrence.as_str())
        .bind(reminder.base_date)
        .bind(reminder.next_trigger)
        .bind(reminder.active)
        .bind(reminder.completed)
        .bind(reminder.notification_sent)
        .bind(reminder.created)
        .bind(reminder.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders SET
                owner_uid = $2, client_ref = $3, title = $4, description = $5,
                reminder_type = $6, priority = $7, recurrence = $8, base_date = $9,
                next_trigger = $10, active = $11, completed = $12,
                notification_sent = $13, updated = $14
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.owner_id.inner_ref())
        .bind(&reminder.client_ref)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.priority.as_str())
        .bind(reminder.recurrence.as_str())
        .bind(reminder.base_date)
        .bind(reminder.next_trigger)
        .bind(reminder.active)
        .bind(reminder.completed)
        .bind(reminder.notification_sent)
        .bind(reminder.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()?;
        raw.try_into().ok()
    }

    async fn find_by_owner(&self, owner_id: &ID) -> Vec<Reminder> {
        let raws = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE owner_uid = $1
            ORDER BY next_trigger ASC
            "#,
        )
        .bind(owner_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();
        into_reminders(raws)
    }

    async fn find_unsent_before(&self, before: i64) -> Vec<Reminder> {
        let raws = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE active AND NOT notification_sent AND next_trigger <= $1
            ORDER BY next_trigger ASC
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();
        into_reminders(raws)
    }

    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<bool> {
        // Zero rows affected means another pass already claimed the occurrence
        let res = sqlx::query(
            r#"
            UPDATE reminders SET notification_sent = TRUE
            WHERE reminder_uid = $1 AND active AND NOT notification_sent
            "#,
        )
        .bind(reminder_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        let raw = sqlx::query_as::<_, ReminderRaw>(
            r#"
            DELETE FROM reminders
            WHERE reminder_uid = $1
            RETURNING *
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()?;
        raw.try_into().ok()
    }
}
