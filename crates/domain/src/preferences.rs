use crate::notification::NotificationType;
use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    InApp,
    Push,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelToggles {
    pub in_app: bool,
    pub push: bool,
    pub email: bool,
}

impl Default for ChannelToggles {
    fn default() -> Self {
        Self {
            in_app: true,
            push: true,
            email: true,
        }
    }
}

/// Per-user delivery preferences consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: ID,
    pub channels: ChannelToggles,
    /// An absent entry means the type is enabled
    pub type_toggles: HashMap<NotificationType, bool>,
}

impl UserPreferences {
    pub fn new(user_id: ID) -> Self {
        Self {
            user_id,
            channels: Default::default(),
            type_toggles: Default::default(),
        }
    }

    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::InApp => self.channels.in_app,
            Channel::Push => self.channels.push,
            Channel::Email => self.channels.email,
        }
    }

    pub fn type_enabled(&self, notification_type: NotificationType) -> bool {
        self.type_toggles
            .get(&notification_type)
            .copied()
            .unwrap_or(true)
    }

    /// A notification goes out on a channel only if the channel is enabled
    /// globally and the type toggle is not explicitly disabled.
    pub fn allows(&self, channel: Channel, notification_type: NotificationType) -> bool {
        self.channel_enabled(channel) && self.type_enabled(notification_type)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let prefs = UserPreferences::new(ID::new());
        assert!(prefs.allows(Channel::InApp, NotificationType::Order));
        assert!(prefs.allows(Channel::Push, NotificationType::Campaign));
        assert!(prefs.allows(Channel::Email, NotificationType::Call));
    }

    #[test]
    fn type_toggle_mutes_every_channel() {
        let mut prefs = UserPreferences::new(ID::new());
        prefs.type_toggles.insert(NotificationType::Campaign, false);
        assert!(!prefs.allows(Channel::InApp, NotificationType::Campaign));
        assert!(!prefs.allows(Channel::Push, NotificationType::Campaign));
        assert!(prefs.allows(Channel::Push, NotificationType::Order));
    }

    #[test]
    fn disabled_channel_wins_over_enabled_type() {
        let mut prefs = UserPreferences::new(ID::new());
        prefs.channels.push = false;
        assert!(!prefs.allows(Channel::Push, NotificationType::Order));
        assert!(prefs.allows(Channel::Email, NotificationType::Order));
    }
}
