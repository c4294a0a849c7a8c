//! # Process abstractions.
//!
//! - [`Process`] - trait for a one-shot, cancelable unit of work
//! - [`ProcessFn`] - function-backed process implementation
//! - [`ProcessRef`] - shared reference to a process (`Arc<dyn Process>`)

mod process;
mod process_fn;

pub use process::{Process, ProcessRef};
pub use process_fn::{process_fn, ProcessFn};
