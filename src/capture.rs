//! # Alert capture hook.
//!
//! Segments contain panics themselves (every process runs under
//! `catch_unwind`), so a panicking process can never take down a worker.
//! What a [`Capture`] implementation gets is the *routed* error: every
//! process or descriptor failure is handed to the capturer before it is
//! passed to the segment's error regime.
//!
//! ## Rules
//! - `report` is called from worker and descriptor-runner tasks; it must be
//!   cheap and non-blocking (hand off to a channel or spawn if needed).
//! - Implementations may be no-ops; [`NoopCapture`] is the default.

use crate::error::SchedError;

/// Hook invoked for every error routed to an error regime.
///
/// Typical implementations forward to an alerting or crash-reporting
/// backend. The default is [`NoopCapture`].
pub trait Capture: Send + Sync + 'static {
    /// Reports a routed error. Must not block.
    fn report(&self, err: &SchedError);
}

/// Capture implementation that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCapture;

impl Capture for NoopCapture {
    fn report(&self, _err: &SchedError) {}
}
