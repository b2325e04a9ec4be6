use crate::reminder::{Priority, ReminderType};
use crate::shared::entity::{Entity, ID};
use crate::shared::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A delivered (or deliverable) message tracked per user. Created by the
/// dispatcher, either from a fired `Reminder` or from a translated domain
/// event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub read: bool,
    pub read_at: Option<i64>,
    pub created_at: i64,
    /// Optional opaque deep-link the presentation layer can navigate to
    pub action_ref: Option<String>,
    /// Correlation ids, e.g. the originating reminder id
    pub metadata: Metadata,
}

impl Entity for Notification {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Everything a producer provides to create a `Notification`; the dispatcher
/// assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub user_id: ID,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub action_ref: Option<String>,
    pub metadata: Metadata,
}

/// The `ReminderType` catalogue plus the types produced by translated domain
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FollowUp,
    Meeting,
    Call,
    Email,
    Task,
    Deadline,
    Birthday,
    Anniversary,
    Renewal,
    Payment,
    Custom,
    Order,
    Client,
    Campaign,
    System,
    Automation,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FollowUp => "follow_up",
            Self::Meeting => "meeting",
            Self::Call => "call",
            Self::Email => "email",
            Self::Task => "task",
            Self::Deadline => "deadline",
            Self::Birthday => "birthday",
            Self::Anniversary => "anniversary",
            Self::Renewal => "renewal",
            Self::Payment => "payment",
            Self::Custom => "custom",
            Self::Order => "order",
            Self::Client => "client",
            Self::Campaign => "campaign",
            Self::System => "system",
            Self::Automation => "automation",
        }
    }
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ReminderType> for NotificationType {
    fn from(reminder_type: ReminderType) -> Self {
        match reminder_type {
            ReminderType::FollowUp => Self::FollowUp,
            ReminderType::Meeting => Self::Meeting,
            ReminderType::Call => Self::Call,
            ReminderType::Email => Self::Email,
            ReminderType::Task => Self::Task,
            ReminderType::Deadline => Self::Deadline,
            ReminderType::Birthday => Self::Birthday,
            ReminderType::Anniversary => Self::Anniversary,
            ReminderType::Renewal => Self::Renewal,
            ReminderType::Payment => Self::Payment,
            ReminderType::Custom => Self::Custom,
        }
    }
}

#[derive(Error, Debug)]
#[error("{0} is not a valid notification type")]
pub struct InvalidNotificationTypeError(pub String);

impl FromStr for NotificationType {
    type Err = InvalidNotificationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow_up" => Ok(Self::FollowUp),
            "meeting" => Ok(Self::Meeting),
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "task" => Ok(Self::Task),
            "deadline" => Ok(Self::Deadline),
            "birthday" => Ok(Self::Birthday),
            "anniversary" => Ok(Self::Anniversary),
            "renewal" => Ok(Self::Renewal),
            "payment" => Ok(Self::Payment),
            "custom" => Ok(Self::Custom),
            "order" => Ok(Self::Order),
            "client" => Ok(Self::Client),
            "campaign" => Ok(Self::Campaign),
            "system" => Ok(Self::System),
            "automation" => Ok(Self::Automation),
            _ => Err(InvalidNotificationTypeError(s.to_string())),
        }
    }
}
