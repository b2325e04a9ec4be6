use thiserror::Error;

/// The error surface exposed to callers of the scheduler and dispatcher.
/// Background cycles (sweep, cleanup, reconcile) log these and carry on.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Invalid input provided: {0}")]
    Validation(String),
    #[error("The requested resource was not found: {0}")]
    NotFound(String),
    #[error("Internal storage error")]
    Storage,
}
