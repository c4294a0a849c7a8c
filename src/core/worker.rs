//! # Worker and descriptor-runner task bodies.
//!
//! A worker loops over the segment's shared process channel and executes
//! each process under a derived context carrying a fresh request identifier.
//! Execution goes through `catch_unwind`, so a panicking process is reported
//! as an error instead of taking the worker down. A descriptor runner drives
//! one descriptor to completion and routes its abnormal exit.
//!
//! ## Rules
//! - Exactly one of three things happens per received process: silent
//!   success, a routed [`SchedError::Process`], or a routed panic (also a
//!   [`SchedError::Process`], with a [`SchedError::Panic`] cause).
//! - Every routed error is shown to the capturer before the regime.
//! - A closed process channel (all descriptors finished) parks the worker
//!   until the segment closes; it never ends the segment by itself.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::capture::Capture;
use crate::descriptors::DescriptorRef;
use crate::error::{panic_payload, SchedError};
use crate::process::ProcessRef;
use crate::regimes::Regime;
use crate::request::RequestSource;

/// Shared receiving end of a segment's process channel.
pub(crate) type SharedReceiver = Arc<Mutex<mpsc::Receiver<ProcessRef>>>;

/// Drives one descriptor; routes its abnormal exit to the regime.
pub(crate) async fn run_descriptor(
    index: usize,
    descriptor: DescriptorRef,
    cancel: CancellationToken,
    out: mpsc::Sender<ProcessRef>,
    regime: Arc<dyn Regime>,
    capture: Arc<dyn Capture>,
) {
    let kind = descriptor.kind();
    tracing::debug!(index, kind, "descriptor starting");
    match descriptor.run(cancel.child_token(), out).await {
        Ok(()) => tracing::debug!(index, kind, "descriptor finished"),
        Err(source) => {
            let err = SchedError::Descriptor {
                index,
                kind,
                source,
            };
            capture.report(&err);
            regime.on_descriptor_error(err);
        }
    }
}

/// Worker loop: receive, execute, route, repeat.
pub(crate) async fn run_worker(
    worker: usize,
    receiver: SharedReceiver,
    cancel: CancellationToken,
    regime: Arc<dyn Regime>,
    capture: Arc<dyn Capture>,
    requests: Arc<dyn RequestSource>,
) {
    loop {
        let mut guard = tokio::select! {
            _ = cancel.cancelled() => return,
            guard = receiver.lock() => guard,
        };
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = guard.recv() => next,
        };
        drop(guard);

        match next {
            Some(process) => {
                run_process(process, &cancel, &regime, &capture, &requests).await;
            }
            None => {
                // all descriptors finished; stay idle until close
                tracing::debug!(worker, "process channel drained, parking");
                cancel.cancelled().await;
                return;
            }
        }
    }
}

/// Executes a single process under panic capture and routes any failure.
async fn run_process(
    process: ProcessRef,
    cancel: &CancellationToken,
    regime: &Arc<dyn Regime>,
    capture: &Arc<dyn Capture>,
    requests: &Arc<dyn RequestSource>,
) {
    let request = requests.mint();
    let description = process.description().to_string();
    tracing::debug!(request = %request, process = %description, "process starting");

    let ctx = cancel.child_token();
    let outcome = AssertUnwindSafe(process.run(ctx)).catch_unwind().await;

    let failure: Option<crate::error::BoxError> = match outcome {
        Ok(Ok(())) => {
            tracing::debug!(request = %request, process = %description, "process finished");
            None
        }
        Ok(Err(source)) => Some(source),
        Err(payload) => Some(Box::new(SchedError::Panic {
            payload: panic_payload(&*payload),
        }) as _),
    };

    if let Some(source) = failure {
        let err = SchedError::Process {
            request,
            description,
            source,
        };
        capture.report(&err);
        regime.on_process_error(err);
    }
}
