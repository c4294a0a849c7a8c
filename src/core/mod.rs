//! Scheduling core: segments, lifecycles, and shutdown helpers.
//!
//! Internal modules:
//! - [`lifecycle`]: the configured/started split ([`Lifecycle`], [`Started`]);
//! - [`segment`]: the N-worker scheduler over a descriptor-fed channel;
//! - [`worker`]: one process execution with panic capture and error routing;
//! - [`parent`]: composite lifecycle aggregating children;
//! - [`wait`]: close-and-wait orchestration with contexts and deadlines.

mod lifecycle;
mod parent;
mod segment;
mod wait;
mod worker;

pub use lifecycle::{Lifecycle, Started};
pub use parent::{Parent, StartedParent};
pub use segment::{Segment, StartedSegment};
pub use wait::{close_wait, close_wait_timeout, wait, wait_timeout};
