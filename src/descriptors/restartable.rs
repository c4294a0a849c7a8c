//! # Restartable descriptor: re-run a delegate on external demand.
//!
//! The delegate runs in a loop under a child token that is registered with a
//! shared [`RestartHandle`]. Calling [`RestartHandle::restart`] cancels every
//! currently-active delegate token (the same descriptor may be running in
//! several segments at once) without touching the segments themselves; each
//! loop then starts a fresh delegate run. Delegate errors propagate and end
//! the loop; cancelling the descriptor's own context ends it cleanly.
//!
//! Shutdown note: a delegate that exits right as the segment closes can be
//! restarted once more before the loop observes cancellation. That sweep run
//! executes under an already-cancelled token and is expected to exit
//! immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::{Descriptor, DescriptorRef};
use crate::error::BoxError;
use crate::process::ProcessRef;

/// Tokens of the delegate runs currently in flight, across all segments.
#[derive(Default)]
struct ActiveRuns {
    next_id: AtomicU64,
    tokens: Mutex<Vec<(u64, CancellationToken)>>,
}

impl ActiveRuns {
    fn register(&self, token: CancellationToken) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tokens.lock().push((id, token));
        id
    }

    fn unregister(&self, id: u64) {
        self.tokens.lock().retain(|(other, _)| *other != id);
    }

    fn cancel_all(&self) {
        for (_, token) in self.tokens.lock().iter() {
            token.cancel();
        }
    }
}

/// Cancels every active delegate run of a [`RestartableDescriptor`].
///
/// Safe to call from anywhere, any number of times; calls made while no
/// delegate is active are no-ops.
#[derive(Clone)]
pub struct RestartHandle {
    active: Arc<ActiveRuns>,
}

impl RestartHandle {
    /// Cancels all active delegate runs, causing their loops to restart them.
    pub fn restart(&self) {
        self.active.cancel_all();
    }
}

/// Descriptor that re-runs its delegate whenever the delegate exits cleanly.
pub struct RestartableDescriptor {
    delegate: DescriptorRef,
    active: Arc<ActiveRuns>,
}

impl RestartableDescriptor {
    /// Wraps `delegate`; the returned handle restarts it on demand.
    pub fn new(delegate: DescriptorRef) -> (Self, RestartHandle) {
        let active = Arc::new(ActiveRuns::default());
        let handle = RestartHandle {
            active: active.clone(),
        };
        (Self { delegate, active }, handle)
    }

    async fn run_loop(
        &self,
        ctx: &CancellationToken,
        out: &mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        loop {
            let child = ctx.child_token();
            let id = self.active.register(child.clone());
            let res = self.delegate.run(child, out.clone()).await;
            self.active.unregister(id);
            res?;
            tracing::debug!(kind = self.delegate.kind(), "restarting delegate");
        }
    }
}

#[async_trait]
impl Descriptor for RestartableDescriptor {
    fn kind(&self) -> &'static str {
        "restartable"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        tokio::select! {
            res = self.run_loop(&ctx, &out) => res,
            _ = ctx.cancelled() => Ok(()),
        }
    }
}
