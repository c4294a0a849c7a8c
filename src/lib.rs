//! # procvisor
//!
//! **Procvisor** is a process scheduling core for Rust.
//!
//! It provides primitives to run long-lived *descriptors* that produce
//! one-shot *processes*, dispatch those processes across a bounded pool of
//! workers with per-process cancellation and panic capture, and compose the
//! resulting units into hierarchical lifecycles. The crate is designed as a
//! building block for daemons and background-job runtimes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Descriptor  │   │  Descriptor  │   │  Descriptor  │
//!     │ (producer 1) │   │ (producer 2) │   │ (producer M) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └─────────────┬────┴──────────────────┘
//!                          ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Segment (N-worker scheduler)                                 │
//! │  - process channel (rendezvous, arrival order)                │
//! │  - root CancellationToken (close propagates everywhere)       │
//! │  - error regime (Collect / Terminate / Drop)                  │
//! │  - completion signal (fires once, after full drain)           │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌─────────┐        ┌─────────┐        ┌─────────┐
//!   │ worker 0│        │ worker 1│  ...   │ worker N│
//!   └────┬────┘        └────┬────┘        └────┬────┘
//!        │ request id +     │                  │
//!        │ child token +    │ catch_unwind     │
//!        ▼ error routing    ▼                  ▼
//!      process.run(ctx)   process.run(ctx)   process.run(ctx)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Segment/Parent (Lifecycle, configured)
//!     └─ start() ──► Started handle
//!                      ├─ close()  : cancel root token (idempotent, non-blocking)
//!                      ├─ done()   : resolves after every task has returned
//!                      └─ errs()   : final error snapshot from the regime
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                          |
//! |-----------------|----------------------------------------------------------|---------------------------------------------|
//! | **Processes**   | One-shot cancelable work units, easy to compose.         | [`Process`], [`ProcessFn`], [`ProcessRef`]  |
//! | **Descriptors** | Long-lived producers: immediate, interval, repeating, recovering, restartable, ad-hoc. | [`Descriptor`], [`AdhocDescriptor`], ... |
//! | **Regimes**     | Decide what a failure does to the segment.               | [`ErrorBehavior`], [`Regime`]               |
//! | **Lifecycles**  | Started/stoppable units and their composition.           | [`Lifecycle`], [`Started`], [`Parent`]      |
//! | **Shutdown**    | Close-and-wait helpers with contexts and deadlines.      | [`wait`], [`close_wait_timeout`]            |
//! | **Alerting**    | Pluggable capture hook for routed errors.                | [`Capture`], [`NoopCapture`]                |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{
//!     close_wait_timeout, AdhocDescriptor, BoxError, ErrorBehavior, ProcessFn, Segment,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // An ad-hoc queue: external code submits, any segment drains.
//!     let (descriptor, submitter) = AdhocDescriptor::new();
//!
//!     let segment = Segment::new(2, vec![Arc::new(descriptor)])
//!         .with_behavior(ErrorBehavior::Collect);
//!     let started = segment.start();
//!
//!     let result = submitter.submit(ProcessFn::arc(
//!         "greet",
//!         |_ctx: CancellationToken| async move {
//!             println!("hello from a worker");
//!             Ok::<_, BoxError>(())
//!         },
//!     ));
//!     result.await?.map_err(|e| e.to_string())?;
//!
//!     close_wait_timeout(&started, Duration::from_secs(1)).await?;
//!     assert!(started.errs().is_empty());
//!     Ok(())
//! }
//! ```

mod capture;
mod core;
mod descriptors;
mod error;
mod process;
mod regimes;
mod request;

// ---- Public re-exports ----

pub use capture::{Capture, NoopCapture};
pub use core::{
    close_wait, close_wait_timeout, wait, wait_timeout, Lifecycle, Parent, Segment, Started,
    StartedParent, StartedSegment,
};
pub use descriptors::{
    AdhocDescriptor, AdhocSubmitter, Descriptor, DescriptorRef, ImmediateDescriptor,
    IntervalDescriptor, ProcessResult, RecoveryDescriptor, RecoveryOptions, RepeatingDescriptor,
    RestartHandle, RestartableDescriptor,
};
pub use error::{BoxError, SchedError};
pub use process::{process_fn, Process, ProcessFn, ProcessRef};
pub use regimes::{CollectRegime, DropRegime, ErrorBehavior, Regime, TerminateRegime};
pub use request::{RequestSource, UuidSource};
