mod dispatcher;
mod error;
mod jobs;
mod scheduler;
mod shared;
mod timer;

pub use dispatcher::{ListenerId, NotificationDispatcher, NotificationSnapshot, NotificationStats};
pub use error::CourierError;
pub use jobs::{start_cleanup_job, start_sweep_job};
pub use scheduler::{CompleteOutcome, CreateReminderInput, ReminderScheduler, UpdateReminderPatch};
pub use timer::{ManualTimer, Timer, TimerHandle, TokioTimer};
