//! # Descriptor trait.
//!
//! `run` is called once when the owning segment starts and is expected to
//! run until the token cancels. Returning `Ok(())` means the descriptor is
//! *finished*: no more work will come from it, and the segment will not
//! restart it (compose with [`RecoveryDescriptor`](crate::RecoveryDescriptor)
//! or [`RestartableDescriptor`](crate::RestartableDescriptor) for that).
//! Returning an error is an abnormal exit, routed to the segment's regime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;
use crate::process::ProcessRef;

/// # Long-lived producer of processes.
///
/// ## Rules
/// - `run` must not retain `out` (or clones of it) past its return; the
///   segment relies on sender drop to observe producer completion.
/// - Emission order within one descriptor is program order.
#[async_trait]
pub trait Descriptor: Send + Sync + 'static {
    /// Stable kind name used when wrapping this descriptor's failures.
    fn kind(&self) -> &'static str;

    /// Produces processes onto `out` until `ctx` cancels or a fatal error occurs.
    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError>;
}

/// Shared handle to a descriptor.
pub type DescriptorRef = Arc<dyn Descriptor>;

/// Sends one process, unless the descriptor context cancels or the segment
/// stopped receiving first. Returns `false` when the emission did not happen.
pub(crate) async fn emit(
    ctx: &CancellationToken,
    out: &mpsc::Sender<ProcessRef>,
    process: ProcessRef,
) -> bool {
    tokio::select! {
        _ = ctx.cancelled() => false,
        res = out.send(process) => res.is_ok(),
    }
}
