use courier_infra::CourierContext;
use tracing::{error, Instrument};

/// One business operation with its own input, output and error surface.
/// Use cases stay stateless between calls; the service objects owning timers
/// and caches orchestrate them.
#[async_trait::async_trait]
pub trait UseCase: std::fmt::Debug + Send {
    type Response;
    type Error: std::fmt::Debug;

    /// Name of the use case, used for logging
    const NAME: &'static str;

    async fn execute(&mut self, ctx: &CourierContext) -> Result<Self::Response, Self::Error>;
}

/// Runs a use case within a tracing span carrying its name, logging failures.
pub async fn execute<U: UseCase>(
    mut usecase: U,
    ctx: &CourierContext,
) -> Result<U::Response, U::Error> {
    let span = tracing::info_span!("usecase", name = U::NAME);
    let res = usecase.execute(ctx).instrument(span).await;
    if let Err(e) = &res {
        error!("Use case: {} failed with error: {:?}", U::NAME, e);
    }
    res
}
