//! # Collect regime: accumulate every error.
//!
//! The segment never closes on its own under this regime; `errors()` returns
//! everything reported, in routing order.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::regimes::Regime;

/// Regime that appends every reported error to an internal list.
#[derive(Default)]
pub struct CollectRegime {
    errors: Mutex<Vec<Arc<SchedError>>>,
    trigger: CancellationToken,
}

impl CollectRegime {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, origin: &'static str, err: SchedError) {
        tracing::warn!(origin, label = err.as_label(), error = %err, "collected error");
        self.errors.lock().push(Arc::new(err));
    }
}

impl Regime for CollectRegime {
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
        self.errors.lock().clone()
    }
}
