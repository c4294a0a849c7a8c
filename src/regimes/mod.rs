//! # Error-handling regimes.
//!
//! A regime decides what happens when a process or descriptor fails inside a
//! segment:
//!
//! - [`CollectRegime`] - accumulate every error; the segment closes only on
//!   an external `close`.
//! - [`TerminateRegime`] - store the first error and request segment
//!   shutdown via the regime trigger.
//! - [`DropRegime`] - discard everything; failures remain visible through
//!   diagnostic logs only.
//!
//! The regime in effect is chosen at segment construction with
//! [`ErrorBehavior`]; workers and descriptor runners route every failure
//! through [`Regime`] methods and never recover errors locally.

mod collect;
mod discard;
mod regime;
mod terminate;

pub use collect::CollectRegime;
pub use discard::DropRegime;
pub use regime::{ErrorBehavior, Regime};
pub use terminate::TerminateRegime;
