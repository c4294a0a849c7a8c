//! # Repeating descriptor: repeat as fast as possible, never overlap.
//!
//! Each emission is a completion-guarded copy of the wrapped process; the
//! next copy is emitted only after the previous copy's run has finished.
//! The completion barrier fires on drop, so a panicking run (or a copy
//! discarded by a closing segment) still releases the next iteration.
//!
//! Sharp edge: there is no minimum inter-iteration delay. A process that
//! returns instantly will be re-emitted immediately and can keep a worker
//! permanently busy. Compose with
//! [`IntervalDescriptor`](crate::IntervalDescriptor) when a floor is needed.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::{emit, Descriptor};
use crate::error::BoxError;
use crate::process::{Process, ProcessRef};

/// Descriptor that re-emits its process after each completed run.
pub struct RepeatingDescriptor {
    process: ProcessRef,
}

impl RepeatingDescriptor {
    /// Repeats `process` with no overlap between consecutive runs.
    pub fn new(process: ProcessRef) -> Self {
        Self { process }
    }
}

#[async_trait]
impl Descriptor for RepeatingDescriptor {
    fn kind(&self) -> &'static str {
        "repeating"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        loop {
            let (finished_tx, finished_rx) = oneshot::channel();
            let copy: ProcessRef = Arc::new(GuardedProcess {
                inner: self.process.clone(),
                barrier: Mutex::new(Some(finished_tx)),
            });
            if !emit(&ctx, &out, copy).await {
                return Ok(());
            }
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                // a closed barrier (copy dropped unrun) counts as finished
                _ = finished_rx => {}
            }
        }
    }
}

/// One process copy whose completion is observable exactly once.
struct GuardedProcess {
    inner: ProcessRef,
    barrier: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl Process for GuardedProcess {
    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let _release = Release(self.barrier.lock().take());
        self.inner.run(ctx).await
    }
}

/// Fires the barrier on drop so completion is signaled even on unwind.
struct Release(Option<oneshot::Sender<()>>);

impl Drop for Release {
    fn drop(&mut self) {
        if let Some(barrier) = self.0.take() {
            let _ = barrier.send(());
        }
    }
}
