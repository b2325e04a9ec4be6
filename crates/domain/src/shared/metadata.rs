use std::collections::HashMap;

/// Opaque key-value bag carried by `Notification`s, used for correlation ids
/// such as the originating `Reminder` id.
pub type Metadata = HashMap<String, String>;
