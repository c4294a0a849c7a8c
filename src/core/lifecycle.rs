//! # Lifecycle: the configured/started split.
//!
//! A [`Lifecycle`] is a description of a runnable unit (a
//! [`Segment`](crate::Segment) or a [`Parent`](crate::Parent)); nothing runs
//! until `start` is called. Starting hands back a [`Started`] handle and
//! spawns the unit's background tasks immediately, so it must happen inside
//! a tokio runtime.
//!
//! ## Rules
//! - `close` is idempotent and never blocks on in-flight work.
//! - `done` resolves exactly once all background tasks have returned;
//!   after that it resolves immediately, forever.
//! - `errs` is stable once `done` has resolved.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SchedError;

/// Configuration of a runnable unit; consumed by `start`.
pub trait Lifecycle: Send + 'static {
    /// Starts the unit's background tasks and returns its runtime handle.
    fn start(self: Box<Self>) -> Box<dyn Started>;
}

/// Runtime handle of a started lifecycle.
#[async_trait]
pub trait Started: Send + Sync {
    /// Requests shutdown. Idempotent; returns without waiting for anything.
    fn close(&self);

    /// Resolves when every background task of the lifecycle has returned.
    async fn done(&self);

    /// Snapshot of the errors retained by the error regime(s).
    fn errs(&self) -> Vec<Arc<SchedError>>;
}
