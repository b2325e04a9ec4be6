mod notification;
mod preferences;
mod recurrence;
mod reminder;
mod shared;
mod smart_event;

pub use notification::{
    InvalidNotificationTypeError, Notification, NotificationInput, NotificationType,
};
pub use preferences::{Channel, ChannelToggles, UserPreferences};
pub use recurrence::{InvalidRecurrenceError, RecurrencePattern};
pub use reminder::{
    InvalidPriorityError, InvalidReminderTypeError, Priority, Reminder, ReminderType,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::metadata::Metadata;
pub use smart_event::{translate, NotificationDraft};
