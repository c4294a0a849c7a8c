//! # Recovery descriptor: restart a failing delegate with a reset window.
//!
//! The delegate runs in a loop. Every failure bumps a retry counter and
//! restarts the delegate; once the counter exceeds `max_retries`, the latest
//! error propagates (so the delegate is invoked at most `max_retries + 1`
//! times under immediate failures). A failure that arrives after the
//! delegate had been running for longer than `reset_after` resets the
//! counter first: a long-healthy producer earns back its full retry budget.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::descriptors::descriptor::{Descriptor, DescriptorRef};
use crate::error::BoxError;
use crate::process::ProcessRef;

/// Tuning knobs for [`RecoveryDescriptor`].
#[derive(Clone, Copy, Debug)]
pub struct RecoveryOptions {
    /// Number of restarts granted before the error propagates.
    pub max_retries: u32,
    /// Minimum healthy runtime after which the retry counter resets.
    pub reset_after: Duration,
}

impl Default for RecoveryOptions {
    /// Defaults: `max_retries = 3`, `reset_after = 500ms`.
    fn default() -> Self {
        Self {
            max_retries: 3,
            reset_after: Duration::from_millis(500),
        }
    }
}

/// Descriptor that retries a failing delegate.
pub struct RecoveryDescriptor {
    delegate: DescriptorRef,
    options: RecoveryOptions,
}

impl RecoveryDescriptor {
    /// Wraps `delegate` with the default [`RecoveryOptions`].
    pub fn new(delegate: DescriptorRef) -> Self {
        Self::with_options(delegate, RecoveryOptions::default())
    }

    /// Wraps `delegate` with explicit options.
    pub fn with_options(delegate: DescriptorRef, options: RecoveryOptions) -> Self {
        Self { delegate, options }
    }
}

#[async_trait]
impl Descriptor for RecoveryDescriptor {
    fn kind(&self) -> &'static str {
        "recovery"
    }

    async fn run(
        &self,
        ctx: CancellationToken,
        out: mpsc::Sender<ProcessRef>,
    ) -> Result<(), BoxError> {
        let mut retries: u32 = 0;
        loop {
            let started = Instant::now();
            match self.delegate.run(ctx.clone(), out.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if ctx.is_cancelled() {
                        // shutting down; a failure during teardown is not abnormal
                        return Ok(());
                    }
                    if started.elapsed() > self.options.reset_after {
                        retries = 0;
                    }
                    retries += 1;
                    if retries > self.options.max_retries {
                        tracing::warn!(
                            kind = self.delegate.kind(),
                            retries,
                            error = %err,
                            "retry budget exhausted"
                        );
                        return Err(err);
                    }
                    tracing::debug!(
                        kind = self.delegate.kind(),
                        retries,
                        error = %err,
                        "restarting failed delegate"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Delegate whose per-call behavior is driven by its call number.
    struct Scripted<F>(AtomicU32, F);

    #[async_trait]
    impl<F> Descriptor for Scripted<F>
    where
        F: Fn(u32) -> ScriptStep + Send + Sync + 'static,
    {
        fn kind(&self) -> &'static str {
            "scripted"
        }

        async fn run(
            &self,
            _ctx: CancellationToken,
            _out: mpsc::Sender<ProcessRef>,
        ) -> Result<(), BoxError> {
            let call = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            let step = (self.1)(call);
            if !step.sleep.is_zero() {
                tokio::time::sleep(step.sleep).await;
            }
            if step.ok {
                Ok(())
            } else {
                Err(format!("call {call} failed").into())
            }
        }
    }

    struct ScriptStep {
        sleep: Duration,
        ok: bool,
    }

    fn channel() -> (mpsc::Sender<ProcessRef>, mpsc::Receiver<ProcessRef>) {
        mpsc::channel(1)
    }

    #[tokio::test]
    async fn succeeds_after_slow_sixth_call() {
        // five immediate failures, then a slow successful run
        let delegate = Arc::new(Scripted(AtomicU32::new(0), |call| ScriptStep {
            sleep: if call == 6 {
                Duration::from_millis(150)
            } else {
                Duration::ZERO
            },
            ok: call == 6,
        }));
        let desc = RecoveryDescriptor::with_options(
            delegate.clone(),
            RecoveryOptions {
                max_retries: 10,
                reset_after: Duration::from_millis(100),
            },
        );
        let (tx, _rx) = channel();
        assert!(desc.run(CancellationToken::new(), tx).await.is_ok());
        assert_eq!(delegate.0.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn propagates_after_budget_exhausted() {
        let delegate = Arc::new(Scripted(AtomicU32::new(0), |_call| ScriptStep {
            sleep: Duration::ZERO,
            ok: false,
        }));
        let desc = RecoveryDescriptor::with_options(
            delegate.clone(),
            RecoveryOptions {
                max_retries: 3,
                reset_after: Duration::from_millis(100),
            },
        );
        let (tx, _rx) = channel();
        let err = desc
            .run(CancellationToken::new(), tx)
            .await
            .expect_err("budget exhausted");
        // max_retries + 1 total calls; the latest error propagates
        assert_eq!(delegate.0.load(Ordering::SeqCst), 4);
        assert!(err.to_string().contains("call 4"));
    }

    #[tokio::test]
    async fn long_run_resets_the_counter() {
        // calls 1-2 fail fast, call 3 fails after a long run, 4+ fail fast
        let delegate = Arc::new(Scripted(AtomicU32::new(0), |call| ScriptStep {
            sleep: if call == 3 {
                Duration::from_millis(150)
            } else {
                Duration::ZERO
            },
            ok: false,
        }));
        let desc = RecoveryDescriptor::with_options(
            delegate.clone(),
            RecoveryOptions {
                max_retries: 3,
                reset_after: Duration::from_millis(100),
            },
        );
        let (tx, _rx) = channel();
        assert!(desc.run(CancellationToken::new(), tx).await.is_err());
        // without the reset this would stop at call 4; the slow third call
        // earns back the budget, pushing exhaustion to call 6
        assert_eq!(delegate.0.load(Ordering::SeqCst), 6);
    }
}
