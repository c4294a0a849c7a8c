//! # Process: a one-shot, cancelable unit of work.
//!
//! A process carries a stable, human-readable description (used in logs and
//! error wrapping) and an async run method that receives a
//! [`CancellationToken`]. Implementors should periodically check the token
//! and exit promptly when their segment closes.
//!
//! Processes are one-shot values: a segment hands each instance to exactly
//! one worker and discards it afterwards. Re-running the same instance is
//! permitted but never done by the scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// # Asynchronous, cancelable unit of work.
///
/// A `Process` has a stable [`description`](Process::description) and an
/// async [`run`](Process::run) method that receives a [`CancellationToken`].
/// A process that ignores its token can delay segment shutdown indefinitely;
/// bound that wait with [`close_wait_timeout`](crate::close_wait_timeout).
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use procvisor::{BoxError, Process};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Process for Demo {
///     fn description(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Process: Send + Sync + 'static {
    /// Returns a stable, human-readable description used for logging.
    fn description(&self) -> &str;

    /// Executes the work until completion or cancellation.
    ///
    /// Implementations should honor `ctx` and exit quickly once it fires.
    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError>;
}

/// Shared handle to a process.
pub type ProcessRef = Arc<dyn Process>;
