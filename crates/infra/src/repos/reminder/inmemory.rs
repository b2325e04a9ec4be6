use super::IReminderRepo;
use crate::repos::shared::inmemory::{delete, find, find_by, insert, save};
use courier_domain::{Reminder, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        save(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_by_owner(&self, owner_id: &ID) -> Vec<Reminder> {
        find_by(&self.reminders, |r: &Reminder| r.owner_id == *owner_id)
    }

    async fn find_unsent_before(&self, before: i64) -> Vec<Reminder> {
        find_by(&self.reminders, |r: &Reminder| {
            r.active && !r.notification_sent && r.next_trigger <= before
        })
    }

    async fn mark_sent(&self, reminder_id: &ID) -> anyhow::Result<bool> {
        // The check-and-set must happen under a single lock acquisition,
        // concurrent claimers of the same occurrence race through here.
        let mut reminders = self.reminders.lock().unwrap();
        match reminders
            .iter_mut()
            .find(|r| r.id == *reminder_id && r.active && !r.notification_sent)
        {
            Some(reminder) => {
                reminder.notification_sent = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        delete(reminder_id, &self.reminders)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use courier_domain::{Priority, RecurrencePattern, ReminderType};

    fn reminder_factory(next_trigger: i64) -> Reminder {
        Reminder {
            id: Default::default(),
            owner_id: Default::default(),
            client_ref: None,
            title: "Call Acme".into(),
            description: String::new(),
            reminder_type: ReminderType::Call,
            priority: Priority::High,
            recurrence: RecurrencePattern::Once,
            base_date: next_trigger,
            next_trigger,
            active: true,
            completed: false,
            notification_sent: false,
            created: 0,
            updated: 0,
        }
    }

    #[tokio::test]
    async fn mark_sent_claims_an_occurrence_exactly_once() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_factory(100);
        repo.insert(&reminder).await.unwrap();

        assert!(repo.mark_sent(&reminder.id).await.unwrap());
        assert!(!repo.mark_sent(&reminder.id).await.unwrap());
    }

    #[tokio::test]
    async fn find_unsent_before_skips_claimed_and_inactive() {
        let repo = InMemoryReminderRepo::new();
        let due = reminder_factory(100);
        let mut claimed = reminder_factory(100);
        claimed.notification_sent = true;
        let mut inactive = reminder_factory(100);
        inactive.active = false;
        let future = reminder_factory(5000);

        for r in [&due, &claimed, &inactive, &future] {
            repo.insert(r).await.unwrap();
        }

        let found = repo.find_unsent_before(200).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = InMemoryReminderRepo::new();
        let reminder = reminder_factory(100);
        repo.insert(&reminder).await.unwrap();

        assert!(repo.delete(&reminder.id).await.is_some());
        assert!(repo.delete(&reminder.id).await.is_none());
    }
}
