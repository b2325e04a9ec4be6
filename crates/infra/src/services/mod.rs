mod feed;
mod sinks;

pub use feed::NotificationFeed;
pub use sinks::{EmailRelaySink, InAppEventSink, NotificationSink, WebhookPushSink};
