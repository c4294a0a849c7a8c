//! # Segment: the N-worker scheduler.
//!
//! A segment runs N workers over a shared process channel fed by M
//! descriptors. Starting it spawns one runner task per descriptor, N worker
//! tasks, a supervisor that turns the regime trigger into a close, and a
//! drain task that fires the completion signal once everything has joined.
//!
//! ```text
//! Descriptor[0] ──┐                       ┌──► worker 0 ──► process.run(child ctx)
//! Descriptor[1] ──┼──► [process channel] ─┼──► worker 1 ──► ...
//! Descriptor[M] ──┘     (rendezvous)      └──► worker N-1
//!
//! regime trigger ──► supervisor ──► root token cancel
//! JoinSet drained ──► completion token (fires exactly once)
//! ```
//!
//! ## State machine
//! Configured → Running (`start`) → Closing (`close` or regime trigger) →
//! Closed (all descriptors, workers, and in-flight processes returned).
//! Further `close` calls are no-ops; `done` then resolves immediately and
//! `errs` returns the final snapshot.
//!
//! ## Ordering
//! Processes are consumed in arrival order but executed concurrently; only
//! `concurrency = 1` gives strict execution order. Closing cancels every
//! descriptor context and every in-flight process context simultaneously.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::capture::{Capture, NoopCapture};
use crate::core::lifecycle::{Lifecycle, Started};
use crate::core::worker::{run_descriptor, run_worker};
use crate::descriptors::DescriptorRef;
use crate::error::SchedError;
use crate::process::ProcessRef;
use crate::regimes::{ErrorBehavior, Regime};
use crate::request::{RequestSource, UuidSource};

/// Immutable description of a scheduler; started with [`Segment::start`].
///
/// ## Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use procvisor::{
///     close_wait_timeout, BoxError, ErrorBehavior, ImmediateDescriptor, ProcessFn, Segment,
/// };
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let hello = ProcessFn::arc("hello", |_ctx: CancellationToken| async move {
///         println!("hello from a worker");
///         Ok::<_, BoxError>(())
///     });
///     let segment = Segment::new(2, vec![Arc::new(ImmediateDescriptor::new(hello))])
///         .with_behavior(ErrorBehavior::Collect);
///
///     let started = segment.start();
///     close_wait_timeout(&started, Duration::from_secs(1))
///         .await
///         .expect("clean shutdown");
///     assert!(started.errs().is_empty());
/// }
/// ```
pub struct Segment {
    concurrency: usize,
    descriptors: Vec<DescriptorRef>,
    behavior: ErrorBehavior,
    capture: Arc<dyn Capture>,
    requests: Arc<dyn RequestSource>,
}

impl Segment {
    /// Creates a segment with `concurrency` workers (clamped to ≥ 1) over
    /// the given descriptors.
    pub fn new(concurrency: usize, descriptors: Vec<DescriptorRef>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            descriptors,
            behavior: ErrorBehavior::default(),
            capture: Arc::new(NoopCapture),
            requests: Arc::new(UuidSource),
        }
    }

    /// Selects the error regime (default: [`ErrorBehavior::Drop`]).
    #[must_use]
    pub fn with_behavior(mut self, behavior: ErrorBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Installs an alert capturer (default: no-op).
    #[must_use]
    pub fn with_capture(mut self, capture: Arc<dyn Capture>) -> Self {
        self.capture = capture;
        self
    }

    /// Installs a request-identifier source (default: UUID v4).
    #[must_use]
    pub fn with_requests(mut self, requests: Arc<dyn RequestSource>) -> Self {
        self.requests = requests;
        self
    }

    /// Starts the segment, spawning its background tasks immediately.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(self) -> StartedSegment {
        let cancel = CancellationToken::new();
        let completed = CancellationToken::new();
        let regime = self.behavior.build();
        let (tx, rx) = mpsc::channel::<ProcessRef>(1);
        let receiver = Arc::new(Mutex::new(rx));

        let mut set = JoinSet::new();
        for (index, descriptor) in self.descriptors.into_iter().enumerate() {
            set.spawn(run_descriptor(
                index,
                descriptor,
                cancel.clone(),
                tx.clone(),
                regime.clone(),
                self.capture.clone(),
            ));
        }
        drop(tx);

        for worker in 0..self.concurrency {
            set.spawn(run_worker(
                worker,
                receiver.clone(),
                cancel.clone(),
                regime.clone(),
                self.capture.clone(),
                self.requests.clone(),
            ));
        }

        // regime trigger requests shutdown exactly like an external close
        {
            let cancel = cancel.clone();
            let trigger = regime.trigger();
            tokio::spawn(async move {
                tokio::select! {
                    _ = trigger.cancelled() => {
                        tracing::debug!("regime requested shutdown");
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            });
        }

        // completion fires once everything has joined
        {
            let completed = completed.clone();
            tokio::spawn(async move {
                while set.join_next().await.is_some() {}
                completed.cancel();
            });
        }

        StartedSegment {
            cancel,
            completed,
            regime,
        }
    }
}

impl Lifecycle for Segment {
    fn start(self: Box<Self>) -> Box<dyn Started> {
        Box::new((*self).start())
    }
}

/// Runtime handle of a running segment.
pub struct StartedSegment {
    cancel: CancellationToken,
    completed: CancellationToken,
    regime: Arc<dyn Regime>,
}

impl StartedSegment {
    /// Requests shutdown: cancels every descriptor context and every
    /// in-flight process context. Idempotent, never blocks.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Resolves once all descriptors, workers, and in-flight processes have
    /// returned. Resolves immediately if that already happened.
    pub async fn done(&self) {
        self.completed.cancelled().await;
    }

    /// Whether the completion signal has fired.
    pub fn is_done(&self) -> bool {
        self.completed.is_cancelled()
    }

    /// Snapshot of the errors retained by the segment's regime.
    pub fn errs(&self) -> Vec<Arc<SchedError>> {
        self.regime.errors()
    }
}

#[async_trait]
impl Started for StartedSegment {
    fn close(&self) {
        StartedSegment::close(self);
    }

    async fn done(&self) {
        StartedSegment::done(self).await;
    }

    fn errs(&self) -> Vec<Arc<SchedError>> {
        StartedSegment::errs(self)
    }
}
