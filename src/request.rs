//! # Request identifier supply.
//!
//! Every process execution is tagged with a freshly minted, opaque request
//! identifier. The identifier travels with the execution's diagnostic logs
//! and is embedded into [`SchedError::Process`](crate::SchedError::Process)
//! wrapping. The default source mints UUID v4 strings; tests substitute a
//! deterministic source via
//! [`Segment::with_requests`](crate::Segment::with_requests).

use uuid::Uuid;

/// Supplier of opaque unique request identifiers.
pub trait RequestSource: Send + Sync + 'static {
    /// Mints a fresh identifier. Each call returns a distinct string.
    fn mint(&self) -> String;
}

/// Default [`RequestSource`] backed by UUID v4.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidSource;

impl RequestSource for UuidSource {
    fn mint(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
