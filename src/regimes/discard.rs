//! # Drop regime: discard everything.
//!
//! Errors still reach the diagnostic log before being dropped; the snapshot
//! is always empty and the segment closes only on an external `close`. This
//! is the default behavior of a new segment.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::regimes::Regime;

/// Regime that logs and discards every reported error.
#[derive(Default)]
pub struct DropRegime {
    trigger: CancellationToken,
}

impl DropRegime {
    /// Creates a drop regime.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regime for DropRegime {
    fn on_process_error(&self, err: SchedError) {
        tracing::warn!(origin = "process", label = err.as_label(), error = %err, "dropped error");
    }

    fn on_descriptor_error(&self, err: SchedError) {
        tracing::warn!(origin = "descriptor", label = err.as_label(), error = %err, "dropped error");
    }

    fn trigger(&self) -> CancellationToken {
        self.trigger.clone()
    }

    fn errors(&self) -> Vec<Arc<SchedError>> {
        Vec::new()
    }
}
