//! # Descriptors: long-lived producers of processes.
//!
//! A descriptor is started once per segment and emits processes onto the
//! segment's internal channel until it is cancelled, finishes, or fails.
//! Built-in variants:
//!
//! - [`ImmediateDescriptor`] - emit one process and finish
//! - [`IntervalDescriptor`] - emit a process on a fixed cadence
//! - [`RepeatingDescriptor`] - re-emit as soon as the previous run finished
//! - [`RecoveryDescriptor`] - retry a failing delegate with a reset window
//! - [`RestartableDescriptor`] - re-run a delegate on external demand
//! - [`AdhocDescriptor`] - drain a process-wide submission queue

mod adhoc;
mod descriptor;
mod immediate;
mod interval;
mod recovery;
mod repeating;
mod restartable;

pub use adhoc::{AdhocDescriptor, AdhocSubmitter, ProcessResult};
pub use descriptor::{Descriptor, DescriptorRef};
pub use immediate::ImmediateDescriptor;
pub use interval::IntervalDescriptor;
pub use recovery::{RecoveryDescriptor, RecoveryOptions};
pub use repeating::RepeatingDescriptor;
pub use restartable::{RestartHandle, RestartableDescriptor};
