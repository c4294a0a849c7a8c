//! # Regime trait and the behavior selector.
//!
//! ## Rules
//! - Regime methods may be invoked concurrently from any worker or
//!   descriptor-runner task; each implementation synchronizes internally.
//! - The trigger is a one-shot shutdown request: only
//!   [`TerminateRegime`](crate::TerminateRegime) ever cancels it, exactly
//!   once, on the first reported error.
//! - `errors()` is a snapshot; it is stable once the owning segment's
//!   completion signal has fired.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::SchedError;
use crate::regimes::{CollectRegime, DropRegime, TerminateRegime};

/// Strategy object that receives every failure reported within a segment.
pub trait Regime: Send + Sync + 'static {
    /// Routes a process failure (already wrapped with request id and description).
    fn on_process_error(&self, err: SchedError);

    /// Routes a descriptor failure (already wrapped with index and kind).
    fn on_descriptor_error(&self, err: SchedError);

    /// One-shot shutdown request. A segment closes itself when this fires.
    fn trigger(&self) -> CancellationToken;

    /// Snapshot of the errors retained so far.
    fn errors(&self) -> Vec<Arc<SchedError>>;
}

/// Selects the error regime a segment is constructed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorBehavior {
    /// Accumulate every reported error.
    Collect,
    /// Store the first error and request segment shutdown.
    Terminate,
    /// Discard all errors (diagnostic logs only).
    #[default]
    Drop,
}

impl ErrorBehavior {
    /// Builds the regime instance for a starting segment.
    pub(crate) fn build(self) -> Arc<dyn Regime> {
        match self {
            ErrorBehavior::Collect => Arc::new(CollectRegime::new()),
            ErrorBehavior::Terminate => Arc::new(TerminateRegime::new()),
            ErrorBehavior::Drop => Arc::new(DropRegime::new()),
        }
    }
}
