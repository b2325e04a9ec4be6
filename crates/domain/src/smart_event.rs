use crate::notification::{NotificationInput, NotificationType};
use crate::reminder::Priority;
use crate::shared::entity::ID;
use serde_json::Value;

/// A translated domain event, not yet addressed to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub action_ref: Option<String>,
}

impl NotificationDraft {
    pub fn for_user(self, user_id: ID) -> NotificationInput {
        NotificationInput {
            user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            priority: self.priority,
            action_ref: self.action_ref,
            metadata: Default::default(),
        }
    }
}

/// Maps a domain event emitted by an external collaborator onto a
/// notification draft. Unknown event types yield `None`; the caller decides
/// whether that is worth logging or a bug.
pub fn translate(event_type: &str, payload: &Value) -> Option<NotificationDraft> {
    let draft = match event_type {
        "new_order" => {
            let client = str_field(payload, "client_name").unwrap_or("A client");
            let total = num_field(payload, "total").unwrap_or(0.0);
            NotificationDraft {
                title: "New order received".into(),
                message: format!("{} placed a new order totalling ${}", client, total),
                notification_type: NotificationType::Order,
                priority: Priority::High,
                action_ref: Some("/orders".into()),
            }
        }
        "order_status_change" => {
            let order = str_field(payload, "order_id").unwrap_or("unknown");
            let status = str_field(payload, "status").unwrap_or("updated");
            NotificationDraft {
                title: "Order status updated".into(),
                message: format!("Order {} is now {}", order, status),
                notification_type: NotificationType::Order,
                priority: Priority::Medium,
                action_ref: Some("/orders".into()),
            }
        }
        "new_client" => {
            let client = str_field(payload, "client_name").unwrap_or("A new client");
            NotificationDraft {
                title: "New client registered".into(),
                message: format!("{} was added to your client list", client),
                notification_type: NotificationType::Client,
                priority: Priority::Medium,
                action_ref: Some("/clients".into()),
            }
        }
        "campaign_expiring" => {
            let campaign = str_field(payload, "campaign_name").unwrap_or("A campaign");
            let days_left = int_field(payload, "days_left").unwrap_or(0);
            NotificationDraft {
                title: "Campaign expiring soon".into(),
                message: format!("{} expires in {} days", campaign, days_left),
                notification_type: NotificationType::Campaign,
                priority: Priority::High,
                action_ref: Some("/campaigns".into()),
            }
        }
        "client_inactive" => {
            let client = str_field(payload, "client_name").unwrap_or("A client");
            let days = int_field(payload, "days_inactive").unwrap_or(0);
            NotificationDraft {
                title: "Client inactive".into(),
                message: format!("{} has had no activity for {} days", client, days),
                notification_type: NotificationType::Client,
                priority: Priority::Medium,
                action_ref: Some("/clients".into()),
            }
        }
        "automation_executed" => {
            let automation = str_field(payload, "automation_name").unwrap_or("An automation");
            NotificationDraft {
                title: "Automation executed".into(),
                message: format!("{} completed a run", automation),
                notification_type: NotificationType::Automation,
                priority: Priority::Low,
                action_ref: Some("/automations".into()),
            }
        }
        "system_maintenance" => {
            let message = str_field(payload, "message")
                .unwrap_or("The system will undergo scheduled maintenance")
                .to_string();
            NotificationDraft {
                title: "Scheduled maintenance".into(),
                message,
                notification_type: NotificationType::System,
                priority: Priority::High,
                action_ref: None,
            }
        }
        _ => return None,
    };
    Some(draft)
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

fn num_field(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key).and_then(Value::as_f64)
}

fn int_field(payload: &Value, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}
