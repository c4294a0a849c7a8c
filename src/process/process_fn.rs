//! # Function-backed process (`ProcessFn`).
//!
//! [`ProcessFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing
//! a fresh future per run. No shared mutable state is required; if state must
//! survive across runs, move an `Arc<...>` into the closure explicitly.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;
use crate::process::process::{Process, ProcessRef};

/// Function-backed process implementation.
///
/// Wraps a closure that *creates* a new future per run.
///
/// ## Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use procvisor::{BoxError, ProcessFn, ProcessRef};
///
/// let p: ProcessRef = ProcessFn::arc("worker", |ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Ok(());
///     }
///     // do work...
///     Ok::<_, BoxError>(())
/// });
///
/// assert_eq!(p.description(), "worker");
/// ```
#[derive(Debug)]
pub struct ProcessFn<F> {
    description: Cow<'static, str>,
    f: F,
}

impl<F> ProcessFn<F> {
    /// Creates a new function-backed process.
    ///
    /// Prefer [`ProcessFn::arc`] when you immediately need a [`ProcessRef`].
    pub fn new(description: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            description: description.into(),
            f,
        }
    }

    /// Creates a function-backed process with an anonymous description.
    pub fn anonymous(f: F) -> Self {
        Self::new("process", f)
    }

    /// Creates the process and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(description: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(description, f))
    }
}

#[async_trait]
impl<F, Fut> Process for ProcessFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        (self.f)(ctx).await
    }
}

/// Convenience constructor: wraps a bare closure into a [`ProcessRef`].
pub fn process_fn<F, Fut>(description: impl Into<Cow<'static, str>>, f: F) -> ProcessRef
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    ProcessFn::arc(description, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_the_wrapped_closure() {
        let p = ProcessFn::new("once", |_ctx: CancellationToken| async move {
            Ok::<_, BoxError>(())
        });
        assert_eq!(p.description(), "once");
        assert!(p.run(CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn anonymous_gets_a_default_description() {
        let p = ProcessFn::anonymous(|_ctx: CancellationToken| async move {
            Ok::<_, BoxError>(())
        });
        assert_eq!(p.description(), "process");
    }
}
