//! # Ad-hoc queue: externally submitted one-shot processes.
//!
//! Construction yields a pair: the descriptor (placed into one or more
//! segments) and the submitter (handed to external code). They share a
//! mutex-protected FIFO plus a wake-up; every active segment running the
//! descriptor is a consumer of the same queue.
//!
//! ```text
//! Submitter ── submit(p) ──► [FIFO] ◄── pop ── descriptor in Segment A
//!                  │                 ◄── pop ── descriptor in Segment B
//!                  └── notify_one (single wake-up per push)
//! ```
//!
//! ## Rules
//! - `submit` never blocks; with no active consumer the submission queues
//!   silently and is served when a segment with this descriptor starts.
//! - Exactly-once delivery across segments: pops are serialized by the
//!   queue mutex, and a submission is popped only after the consumer has
//!   reserved channel capacity for it.
//! - The result channel resolves exactly once: with the process outcome,
//!   with a [`SchedError::Panic`] value when the process panicked, or with
//!   [`SchedError::Canceled`] when the executing worker's context was
//!   cancelled before the process ran.
//! - A submission whose segment closes before any worker runs it goes back
//!   to the head of the queue and is served by the next consumer; closing
//!   never drops a dequeued submission on the floor.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::Descriptor;
use crate::error::{panic_payload, BoxError, SchedError};
use crate::process::{Process, ProcessRef};

/// Outcome delivered to an ad-hoc submitter: success, or the shared failure.
pub type ProcessResult = Result<(), Arc<dyn std::error::Error + Send + Sync>>;

struct Submission {
    process: ProcessRef,
    result: oneshot::Sender<ProcessResult>,
}

/// Queue state shared by the descriptor and the submitter.
#[derive(Default)]
struct AdhocState {
    queue: Mutex<VecDeque<Submission>>,
    wake: Notify,
    consumers: AtomicUsize,
}

/// Descriptor that drains the shared submission queue.
pub struct AdhocDescriptor {
    state: Arc<AdhocState>,
}

impl AdhocDescriptor {
    /// Creates a queue and returns the descriptor/submitter pair.
    pub fn new() -> (Self, AdhocSubmitter) {
        let state = Arc::new(AdhocState::default());
        let submitter = AdhocSubmitter {
            state: state.clone(),
        };
        (Self { state }, submitter)
    }
}

#[async_trait]
impl Descriptor for AdhocDescriptor {
    fn kind(&self) -> &'static str {
        "adhoc"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        let _consumer = ConsumerGuard::register(&self.state);
        loop {
            if self.state.queue.lock().is_empty() {
                let notified = self.state.wake.notified();
                tokio::select! {
                    _ = ctx.cancelled() => return Ok(()),
                    _ = notified => continue,
                }
            }

            // secure channel capacity before taking a submission, so a
            // cancelled send can never lose a popped entry
            let permit = tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                res = out.reserve() => match res {
                    Ok(permit) => permit,
                    Err(_closed) => return Ok(()),
                },
            };

            // another consumer may have drained the queue meanwhile
            let Some(submission) = self.state.queue.lock().pop_front() else {
                drop(permit);
                continue;
            };
            permit.send(Arc::new(SubmittedProcess {
                inner: submission.process,
                result: Mutex::new(Some(submission.result)),
                state: self.state.clone(),
            }));
        }
    }
}

/// External handle for feeding the queue.
#[derive(Clone)]
pub struct AdhocSubmitter {
    state: Arc<AdhocState>,
}

impl AdhocSubmitter {
    /// Appends a process to the queue tail and returns its result channel.
    ///
    /// Never blocks; queues silently when no segment is consuming.
    pub fn submit(&self, process: ProcessRef) -> oneshot::Receiver<ProcessResult> {
        let (result_tx, result_rx) = oneshot::channel();
        self.state.queue.lock().push_back(Submission {
            process,
            result: result_tx,
        });
        self.state.wake.notify_one();
        result_rx
    }

    /// Number of submissions still waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.state.queue.lock().len()
    }

    /// Number of segments currently consuming this queue.
    pub fn consumers(&self) -> usize {
        self.state.consumers.load(Ordering::SeqCst)
    }
}

/// Ref-counted consumer registration; decrements on descriptor exit.
struct ConsumerGuard<'a> {
    state: &'a AdhocState,
}

impl<'a> ConsumerGuard<'a> {
    fn register(state: &'a AdhocState) -> Self {
        state.consumers.fetch_add(1, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for ConsumerGuard<'_> {
    fn drop(&mut self) {
        self.state.consumers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A submission on its way through a worker; mirrors the outcome to the
/// submitter's result channel.
///
/// The result sender stays armed until the process actually runs. Dropping
/// the wrapper while it is still armed (a segment closed with the submission
/// parked in its process channel) puts the submission back at the head of the
/// shared queue for the next consumer.
struct SubmittedProcess {
    inner: ProcessRef,
    result: Mutex<Option<oneshot::Sender<ProcessResult>>>,
    state: Arc<AdhocState>,
}

#[async_trait]
impl Process for SubmittedProcess {
    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let Some(result) = self.result.lock().take() else {
            return Ok(());
        };
        if ctx.is_cancelled() {
            let _ = result.send(Err(Arc::new(SchedError::Canceled)));
            return Ok(());
        }
        match AssertUnwindSafe(self.inner.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => {
                let _ = result.send(Ok(()));
                Ok(())
            }
            Ok(Err(err)) => {
                let shared: Arc<dyn std::error::Error + Send + Sync> = Arc::from(err);
                let _ = result.send(Err(shared.clone()));
                Err(Box::new(shared))
            }
            Err(payload) => {
                // signal the submitter, then let the worker observe the panic
                let _ = result.send(Err(Arc::new(SchedError::Panic {
                    payload: panic_payload(&*payload),
                })));
                std::panic::resume_unwind(payload)
            }
        }
    }
}

impl Drop for SubmittedProcess {
    fn drop(&mut self) {
        let Some(result) = self.result.get_mut().take() else {
            return;
        };
        self.state.queue.lock().push_front(Submission {
            process: self.inner.clone(),
            result,
        });
        self.state.wake.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessFn;

    fn ok_process(tag: &'static str) -> ProcessRef {
        ProcessFn::arc(tag, |_ctx: CancellationToken| async move {
            Ok::<_, BoxError>(())
        })
    }

    /// Drives one consumer loop and executes everything it forwards.
    fn spawn_consumer(
        desc: Arc<AdhocDescriptor>,
        ctx: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let (tx, mut rx) = mpsc::channel::<ProcessRef>(1);
            let consume = async {
                while let Some(p) = rx.recv().await {
                    let _ = p.run(CancellationToken::new()).await;
                }
            };
            let _ = tokio::join!(desc.run(ctx, tx), consume);
        })
    }

    #[tokio::test]
    async fn submissions_queue_silently_without_consumers() {
        let (_desc, submitter) = AdhocDescriptor::new();
        let mut pending = submitter.submit(ok_process("p3"));
        assert_eq!(submitter.queue_len(), 1);
        assert_eq!(submitter.consumers(), 0);
        // no value yet
        assert!(pending.try_recv().is_err());
    }

    #[tokio::test]
    async fn drains_pre_queued_submissions_in_fifo_order() {
        let (desc, submitter) = AdhocDescriptor::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut results = Vec::new();
        for n in 0..3u32 {
            let order = order.clone();
            results.push(submitter.submit(ProcessFn::arc(
                "ordered",
                move |_ctx: CancellationToken| {
                    let order = order.clone();
                    async move {
                        order.lock().push(n);
                        Ok::<_, BoxError>(())
                    }
                },
            )));
        }
        assert_eq!(submitter.queue_len(), 3);

        let ctx = CancellationToken::new();
        let consumer = spawn_consumer(Arc::new(desc), ctx.clone());
        for rx in results {
            assert!(rx.await.expect("delivered").is_ok());
        }
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(submitter.queue_len(), 0);

        ctx.cancel();
        consumer.await.expect("join");
    }

    #[tokio::test]
    async fn serves_across_consumer_generations() {
        let (desc, submitter) = AdhocDescriptor::new();
        let desc = Arc::new(desc);

        // generation A
        let ctx_a = CancellationToken::new();
        let consumer_a = spawn_consumer(desc.clone(), ctx_a.clone());
        assert!(submitter.submit(ok_process("p1")).await.expect("p1").is_ok());
        ctx_a.cancel();
        consumer_a.await.expect("join");
        assert_eq!(submitter.consumers(), 0);

        // generation B
        let ctx_b = CancellationToken::new();
        let consumer_b = spawn_consumer(desc.clone(), ctx_b.clone());
        assert!(submitter.submit(ok_process("p2")).await.expect("p2").is_ok());
        ctx_b.cancel();
        consumer_b.await.expect("join");

        // no consumer: queues silently
        let mut p3 = submitter.submit(ok_process("p3"));
        assert_eq!(submitter.queue_len(), 1);
        assert!(p3.try_recv().is_err());
    }

    #[tokio::test]
    async fn failures_reach_the_submitter() {
        let (desc, submitter) = AdhocDescriptor::new();
        let ctx = CancellationToken::new();
        let consumer = spawn_consumer(Arc::new(desc), ctx.clone());

        let rx = submitter.submit(ProcessFn::arc(
            "failing",
            |_ctx: CancellationToken| async move { Err::<(), BoxError>("boom".into()) },
        ));
        let outcome = rx.await.expect("delivered");
        assert_eq!(outcome.expect_err("failure").to_string(), "boom");

        ctx.cancel();
        consumer.await.expect("join");
    }

    #[tokio::test]
    async fn each_submission_is_executed_exactly_once_across_consumers() {
        let (desc, submitter) = AdhocDescriptor::new();
        let desc = Arc::new(desc);
        let ctx = CancellationToken::new();
        let c1 = spawn_consumer(desc.clone(), ctx.clone());
        let c2 = spawn_consumer(desc.clone(), ctx.clone());

        let runs = Arc::new(AtomicUsize::new(0));
        let mut receivers = Vec::new();
        for _ in 0..20 {
            let runs = runs.clone();
            receivers.push(submitter.submit(ProcessFn::arc(
                "counted",
                move |_ctx: CancellationToken| {
                    let runs = runs.clone();
                    async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, BoxError>(())
                    }
                },
            )));
        }
        for rx in receivers {
            assert!(rx.await.expect("delivered").is_ok());
        }
        assert_eq!(runs.load(Ordering::SeqCst), 20);

        ctx.cancel();
        c1.await.expect("join");
        c2.await.expect("join");
    }

    #[tokio::test]
    async fn serves_across_segment_lifecycles() {
        use std::time::Duration;

        use crate::core::{close_wait_timeout, Segment};
        use crate::descriptors::DescriptorRef;

        let (desc, submitter) = AdhocDescriptor::new();
        let desc: DescriptorRef = Arc::new(desc);

        let a = Segment::new(1, vec![desc.clone()]).start();
        assert!(submitter.submit(ok_process("p1")).await.expect("p1").is_ok());
        close_wait_timeout(&a, Duration::from_secs(2))
            .await
            .expect("segment A closed");

        let b = Segment::new(1, vec![desc.clone()]).start();
        assert!(submitter.submit(ok_process("p2")).await.expect("p2").is_ok());
        close_wait_timeout(&b, Duration::from_secs(2))
            .await
            .expect("segment B closed");

        // no segment left: p3 queues silently
        let mut p3 = submitter.submit(ok_process("p3"));
        assert_eq!(submitter.queue_len(), 1);
        assert!(p3.try_recv().is_err());
    }

    #[tokio::test]
    async fn submission_parked_in_a_closing_segment_is_not_lost() {
        use std::time::Duration;

        use tokio::sync::oneshot::error::TryRecvError;

        use crate::core::{close_wait_timeout, Segment};
        use crate::descriptors::DescriptorRef;

        let (desc, submitter) = AdhocDescriptor::new();
        let desc: DescriptorRef = Arc::new(desc);
        let started = Segment::new(1, vec![desc.clone()]).start();

        // occupy the only worker with a process that parks until close
        let blocker = submitter.submit(ProcessFn::arc(
            "blocker",
            |ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Ok::<_, BoxError>(())
            },
        ));
        // the second submission ends up parked in the process channel
        let mut parked = submitter.submit(ok_process("parked"));
        for _ in 0..200 {
            if submitter.queue_len() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(submitter.queue_len(), 0);

        close_wait_timeout(&started, Duration::from_secs(2))
            .await
            .expect("closed");
        assert!(blocker.await.expect("blocker resolved").is_ok());

        match parked.try_recv() {
            // the worker picked it up mid-close and resolved it as cancelled
            Ok(outcome) => {
                let err = outcome.expect_err("cancelled");
                assert!(err.downcast_ref::<SchedError>().is_some());
            }
            // back in the queue; the next segment serves it
            Err(TryRecvError::Empty) => {
                assert_eq!(submitter.queue_len(), 1);
                let next = Segment::new(1, vec![desc.clone()]).start();
                assert!(parked.await.expect("served").is_ok());
                close_wait_timeout(&next, Duration::from_secs(2))
                    .await
                    .expect("closed");
            }
            Err(TryRecvError::Closed) => panic!("submission dropped without a result"),
        }
    }

    #[tokio::test]
    async fn panicking_submission_reports_a_panic_error() {
        use std::time::Duration;

        use crate::core::{close_wait_timeout, Segment};
        use crate::descriptors::DescriptorRef;

        let (desc, submitter) = AdhocDescriptor::new();
        let desc: DescriptorRef = Arc::new(desc);
        let started = Segment::new(1, vec![desc]).start();

        let rx = submitter.submit(ProcessFn::arc(
            "exploding",
            |_ctx: CancellationToken| async move {
                if true {
                    panic!("boom");
                }
                Ok::<_, BoxError>(())
            },
        ));
        let err = rx.await.expect("signaled").expect_err("panic outcome");
        let sched = err.downcast_ref::<SchedError>().expect("scheduler error");
        assert!(sched.is_panic());
        assert!(sched.to_string().contains("boom"));

        close_wait_timeout(&started, Duration::from_secs(2))
            .await
            .expect("closed");
    }

    #[tokio::test]
    async fn cancelled_worker_context_reports_canceled() {
        let process = Arc::new(SubmittedProcess {
            inner: ok_process("late"),
            result: Mutex::new(None),
            state: Arc::new(AdhocState::default()),
        });
        // direct check of the pre-execution cancellation path
        let (tx, rx) = oneshot::channel();
        *process.result.lock() = Some(tx);
        let ctx = CancellationToken::new();
        ctx.cancel();
        assert!(process.run(ctx).await.is_ok());
        let outcome = rx.await.expect("delivered");
        let err = outcome.expect_err("canceled");
        assert!(err.downcast_ref::<SchedError>().is_some());
    }
}
