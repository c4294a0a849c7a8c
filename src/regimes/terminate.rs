//! # Terminate regime: first error wins, then shut the segment down.
//!
//! The first reported error is stored and the trigger is cancelled exactly
//! once; every subsequent error is suppressed (logged at debug level only).
//! The snapshot is therefore always empty or a singleton.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::regimes::Regime;

/// Regime that stores the first error and requests segment shutdown.
#[derive(Default)]
pub struct TerminateRegime {
    first: Mutex<Option<Arc<SchedError>>>,
    trigger: CancellationToken,
}

impl TerminateRegime {
    /// Creates a terminate regime with no error stored.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, origin: &'static str, err: SchedError) {
        let mut slot = self.first.lock();
        if slot.is_some() {
            tracing::debug!(origin, label = err.as_label(), error = %err, "error after trigger, suppressed");
            return;
        }
        tracing::warn!(origin, label = err.as_label(), error = %err, "terminating on first error");
        *slot = Some(Arc::new(err));
        drop(slot);
        self.trigger.cancel();
    }
}

impl Regime for TerminateRegime {
    fn on_process_error(&self, err: SchedError) {
        self.record("process", err);
    }

    fn on_descriptor_error(&self, err: SchedError) {
        self.record("descriptor", err);
    }

    fn trigger(&self) -> CancellationToken {
        self.trigger.clone()
    }

    fn errors(&self) -> Vec<Arc<SchedError>> {
        self.first.lock().iter().cloned().collect()
    }
}
