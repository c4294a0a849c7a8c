//! Error types used by the procvisor scheduler.
//!
//! Everything a segment reports flows through [`SchedError`]:
//!
//! - process failures are wrapped with the request identifier and the
//!   process description,
//! - descriptor failures are wrapped with the descriptor's ordinal position
//!   and stable kind name,
//! - recovered panics are coerced to [`SchedError::Panic`] and attached as
//!   the cause of the wrapping error.
//!
//! Wrapped causes stay reachable via [`std::error::Error::source`], and
//! snapshots hand errors out as `Arc<SchedError>` so that regimes, started
//! lifecycles, and ad-hoc submitters can all observe the same value.

use std::time::Duration;

use thiserror::Error;

/// Boxed error type returned by processes and descriptors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// # Errors produced by the scheduling core.
///
/// These cover both work failures (process/descriptor) and scheduler-adjacent
/// outcomes (wait helpers giving up before a lifecycle finished).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedError {
    /// A process returned an error or panicked while running.
    #[error("process {description:?} (request {request}) failed: {source}")]
    Process {
        /// Request identifier minted for this execution.
        request: String,
        /// The process's own description.
        description: String,
        /// The underlying failure (a [`SchedError::Panic`] if it panicked).
        #[source]
        source: BoxError,
    },

    /// A descriptor's run returned an error (abnormal producer exit).
    #[error("descriptor #{index} ({kind}) failed: {source}")]
    Descriptor {
        /// Ordinal position of the descriptor within its segment.
        index: usize,
        /// Stable kind name of the descriptor.
        kind: &'static str,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },

    /// A recovered panic payload, coerced to an error.
    #[error("panic: {payload}")]
    Panic {
        /// Stringified panic payload (`"unknown panic"` for non-string payloads).
        payload: String,
    },

    /// Execution context was cancelled before the work ran.
    ///
    /// Delivered to ad-hoc submitters whose process was dequeued by a worker
    /// that was already shutting down.
    #[error("cancelled before execution")]
    Canceled,

    /// A wait helper was cancelled by its own context before the lifecycle finished.
    #[error("wait cancelled before lifecycle completion")]
    WaitCanceled,

    /// A wait helper hit its deadline before the lifecycle finished.
    #[error("wait timed out after {timeout:?}")]
    WaitTimeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },
}

impl SchedError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::SchedError;
    ///
    /// let err = SchedError::Canceled;
    /// assert_eq!(err.as_label(), "canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedError::Process { .. } => "process_failed",
            SchedError::Descriptor { .. } => "descriptor_failed",
            SchedError::Panic { .. } => "panic",
            SchedError::Canceled => "canceled",
            SchedError::WaitCanceled => "wait_canceled",
            SchedError::WaitTimeout { .. } => "wait_timeout",
        }
    }

    /// Indicates whether this error originated in a panicking process or descriptor.
    pub fn is_panic(&self) -> bool {
        match self {
            SchedError::Panic { .. } => true,
            SchedError::Process { source, .. } | SchedError::Descriptor { source, .. } => source
                .downcast_ref::<SchedError>()
                .is_some_and(SchedError::is_panic),
            _ => false,
        }
    }
}

/// Stringifies a recovered panic payload.
pub(crate) fn panic_payload(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn process_error_exposes_cause() {
        let err = SchedError::Process {
            request: "r-1".into(),
            description: "demo".into(),
            source: "boom".into(),
        };
        assert_eq!(err.as_label(), "process_failed");
        let cause = err.source().expect("cause");
        assert_eq!(cause.to_string(), "boom");
    }

    #[test]
    fn panic_is_detected_through_wrapping() {
        let err = SchedError::Descriptor {
            index: 2,
            kind: "immediate",
            source: Box::new(SchedError::Panic {
                payload: "oops".into(),
            }),
        };
        assert!(err.is_panic());
        assert!(err.to_string().contains("#2"));
        assert!(err.to_string().contains("immediate"));
    }

    #[test]
    fn plain_failure_is_not_a_panic() {
        let err = SchedError::Process {
            request: "r-2".into(),
            description: "demo".into(),
            source: "boom".into(),
        };
        assert!(!err.is_panic());
    }
}
