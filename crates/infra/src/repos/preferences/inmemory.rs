use super::IPreferencesRepo;
use courier_domain::{UserPreferences, ID};
use std::sync::Mutex;

pub struct InMemoryPreferencesRepo {
    preferences: Mutex<Vec<UserPreferences>>,
}

impl InMemoryPreferencesRepo {
    pub fn new() -> Self {
        Self {
            preferences: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPreferencesRepo for InMemoryPreferencesRepo {
    async fn find(&self, user_id: &ID) -> Option<UserPreferences> {
        let preferences = self.preferences.lock().unwrap();
        preferences.iter().find(|p| p.user_id == *user_id).cloned()
    }

    async fn save(&self, prefs: &UserPreferences) -> anyhow::Result<()> {
        let mut preferences = self.preferences.lock().unwrap();
        match preferences.iter_mut().find(|p| p.user_id == prefs.user_id) {
            Some(existing) => *existing = prefs.clone(),
            None => preferences.push(prefs.clone()),
        }
        Ok(())
    }
}
