//! # Close-and-wait orchestration.
//!
//! A lifecycle whose processes ignore their context can delay completion
//! indefinitely; these helpers bound that wait with a caller-supplied
//! context or deadline.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::lifecycle::Started;
use crate::error::SchedError;

/// Blocks until the lifecycle completes or `ctx` cancels first.
pub async fn wait(lc: &dyn Started, ctx: &CancellationToken) -> Result<(), SchedError> {
    tokio::select! {
        _ = lc.done() => Ok(()),
        _ = ctx.cancelled() => Err(SchedError::WaitCanceled),
    }
}

/// Blocks until the lifecycle completes, up to `timeout`.
pub async fn wait_timeout(lc: &dyn Started, timeout: Duration) -> Result<(), SchedError> {
    match time::timeout(timeout, lc.done()).await {
        Ok(()) => Ok(()),
        Err(_elapsed) => Err(SchedError::WaitTimeout { timeout }),
    }
}

/// Closes the lifecycle, then [`wait`]s for it.
pub async fn close_wait(lc: &dyn Started, ctx: &CancellationToken) -> Result<(), SchedError> {
    lc.close();
    wait(lc, ctx).await
}

/// Closes the lifecycle, then [`wait_timeout`]s for it.
pub async fn close_wait_timeout(lc: &dyn Started, timeout: Duration) -> Result<(), SchedError> {
    lc.close();
    wait_timeout(lc, timeout).await
}
