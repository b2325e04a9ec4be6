use crate::error::CourierError;
use crate::shared::usecase::UseCase;
use courier_domain::Reminder;
use courier_infra::CourierContext;

/// Loads the active, unclaimed reminders due before `horizon_millis`. Startup
/// reconciliation passes now plus the lookahead window, the periodic sweep
/// passes now.
#[derive(Debug)]
pub(crate) struct ReconcileUseCase {
    pub horizon_millis: i64,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum UseCaseError {}

impl From<UseCaseError> for CourierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait]
impl UseCase for ReconcileUseCase {
    type Response = Vec<Reminder>;
    type Error = UseCaseError;

    const NAME: &'static str = "Reconcile";

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx
            .repos
            .reminders
            .find_unsent_before(self.horizon_millis)
            .await)
    }
}
