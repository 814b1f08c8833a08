use crate::sim::config::SimConfig;
use shortlink::{AllocError, Allocator, RandSource, RecordStore, RequestContext, TimeSource, Token};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What one allocation attempt by a writer came to.
#[derive(Debug)]
pub enum Outcome {
    Allocated { token: Token, url: String },
    Failed(AllocError),
}

/// Allocates `links_per_writer` links for writer `id`, one at a time.
///
/// Stops early once `shutdown` is cancelled; the interrupted allocation is
/// reported as [`AllocError::Cancelled`].
#[tracing::instrument(level = "debug", skip_all, fields(writer = id))]
pub async fn run_writer<S, R, T>(
    id: usize,
    allocator: Arc<Allocator<S, R, T>>,
    config: Arc<SimConfig>,
    shutdown: CancellationToken,
) -> Vec<Outcome>
where
    S: RecordStore,
    R: RandSource<u64>,
    T: TimeSource<u64>,
{
    let mut outcomes = Vec::with_capacity(config.links_per_writer);

    for n in 0..config.links_per_writer {
        if shutdown.is_cancelled() {
            tracing::info!(completed = n, "writer stopped by shutdown");
            break;
        }

        let url = format!("{}/{id}/{n}", config.url);
        let ctx = RequestContext::new()
            .with_timeout(config.store_timeout)
            .with_cancellation(shutdown.child_token());

        match allocator.allocate_in(&ctx, &config.hint, &url).await {
            Ok(token) => outcomes.push(Outcome::Allocated { token, url }),
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "allocation failed");
                outcomes.push(Outcome::Failed(e));
            }
        }
    }

    outcomes
}
