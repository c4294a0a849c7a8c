//! # Immediate descriptor: emit one process, then finish.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::{emit, Descriptor};
use crate::error::BoxError;
use crate::process::ProcessRef;

/// Descriptor that sends exactly one process and returns.
pub struct ImmediateDescriptor {
    process: ProcessRef,
}

impl ImmediateDescriptor {
    /// Wraps `process` for one-shot emission.
    pub fn new(process: ProcessRef) -> Self {
        Self { process }
    }
}

#[async_trait]
impl Descriptor for ImmediateDescriptor {
    fn kind(&self) -> &'static str {
        "immediate"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        emit(&ctx, &out, self.process.clone()).await;
        Ok(())
    }
}
