use crate::recurrence::RecurrencePattern;
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A `Reminder` is the persisted record the scheduler turns into a timed
/// trigger. The store is the source of truth; the scheduler registry is a
/// derived cache that reconciles on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ID,
    /// The user this reminder is assigned to and who receives the resulting
    /// `Notification` when it fires
    pub owner_id: ID,
    /// Optional opaque reference to the client record this reminder concerns
    pub client_ref: Option<String>,
    pub title: String,
    pub description: String,
    pub reminder_type: ReminderType,
    pub priority: Priority,
    pub recurrence: RecurrencePattern,
    /// Timestamp in millis the recurrence arithmetic is anchored to
    pub base_date: i64,
    /// Timestamp in millis of the current due occurrence
    pub next_trigger: i64,
    /// False means no further timers may be armed for this reminder
    pub active: bool,
    pub completed: bool,
    /// Guards against duplicate delivery for the current occurrence. Reset to
    /// false whenever a new `next_trigger` is computed.
    pub notification_sent: bool,
    pub created: i64,
    pub updated: i64,
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
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
}

impl ReminderType {
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
        }
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("{0} is not a valid reminder type")]
pub struct InvalidReminderTypeError(pub String);

impl FromStr for ReminderType {
    type Err = InvalidReminderTypeError;

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
            _ => Err(InvalidReminderTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("{0} is not a valid priority")]
pub struct InvalidPriorityError(pub String);

impl FromStr for Priority {
    type Err = InvalidPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(InvalidPriorityError(s.to_string())),
        }
    }
}
