//! # Interval descriptor: emit on a fixed cadence.
//!
//! Emits its process, sleeps `every` (cancellable), repeats. The cadence
//! does not account for process runtime; overlapping executions across
//! workers are possible when the pool has spare capacity.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::{emit, Descriptor};
use crate::error::BoxError;
use crate::process::ProcessRef;

/// Descriptor that emits the same process every `every`.
pub struct IntervalDescriptor {
    every: Duration,
    process: ProcessRef,
}

impl IntervalDescriptor {
    /// Emits `process` now and then every `every` until cancelled.
    pub fn new(every: Duration, process: ProcessRef) -> Self {
        Self { every, process }
    }
}

#[async_trait]
impl Descriptor for IntervalDescriptor {
    fn kind(&self) -> &'static str {
        "interval"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        loop {
            if !emit(&ctx, &out, self.process.clone()).await {
                return Ok(());
            }
            let sleep = time::sleep(self.every);
            tokio::pin!(sleep);
            tokio::select! {
                _ = &mut sleep => {}
                _ = ctx.cancelled() => return Ok(()),
            }
        }
    }
}
