//! # Parent: composite lifecycle.
//!
//! A parent groups sibling lifecycles. Starting it starts every child;
//! `close` fans out to all of them, `done` resolves when every child's
//! `done` has resolved, and `errs` concatenates the children's snapshots in
//! child order.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::core::lifecycle::{Lifecycle, Started};
use crate::error::SchedError;

/// Groups zero or more lifecycles into one.
#[derive(Default)]
pub struct Parent {
    children: Vec<Box<dyn Lifecycle>>,
}

impl Parent {
    /// Creates a parent over the given children.
    pub fn new(children: Vec<Box<dyn Lifecycle>>) -> Self {
        Self { children }
    }

    /// Adds a child; builder style.
    #[must_use]
    pub fn with_child(mut self, child: impl Lifecycle) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Starts every child and returns the composite handle.
    pub fn start(self) -> StartedParent {
        StartedParent {
            children: self.children.into_iter().map(Lifecycle::start).collect(),
        }
    }
}

impl Lifecycle for Parent {
    fn start(self: Box<Self>) -> Box<dyn Started> {
        Box::new((*self).start())
    }
}

/// Runtime handle over the started children.
pub struct StartedParent {
    children: Vec<Box<dyn Started>>,
}

impl StartedParent {
    /// Closes every child. Idempotent, never blocks.
    pub fn close(&self) {
        for child in &self.children {
            child.close();
        }
    }

    /// Resolves once every child's `done` has resolved.
    pub async fn done(&self) {
        join_all(self.children.iter().map(|child| child.done())).await;
    }

    /// Concatenation of the children's snapshots, in child order.
    pub fn errs(&self) -> Vec<Arc<SchedError>> {
        self.children
            .iter()
            .flat_map(|child| child.errs())
            .collect()
    }
}

#[async_trait]
impl Started for StartedParent {
    fn close(&self) {
        StartedParent::close(self);
    }

    async fn done(&self) {
        StartedParent::done(self).await;
    }

    fn errs(&self) -> Vec<Arc<SchedError>> {
        StartedParent::errs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::core::segment::Segment;
    use crate::core::wait::close_wait_timeout;
    use crate::descriptors::{DescriptorRef, ImmediateDescriptor};
    use crate::error::BoxError;
    use crate::process::ProcessFn;
    use crate::regimes::ErrorBehavior;

    fn failing_segment(msg: &'static str) -> Segment {
        let process = ProcessFn::arc("failing", move |_ctx: CancellationToken| async move {
            Err::<(), BoxError>(msg.into())
        });
        let descriptor: DescriptorRef = Arc::new(ImmediateDescriptor::new(process));
        Segment::new(1, vec![descriptor]).with_behavior(ErrorBehavior::Collect)
    }

    #[tokio::test]
    async fn fans_close_and_done_across_children() {
        let parent = Parent::new(Vec::new())
            .with_child(failing_segment("E1"))
            .with_child(failing_segment("E2"));
        let started = parent.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        close_wait_timeout(&started, Duration::from_secs(2))
            .await
            .expect("all children closed");

        let messages: Vec<String> = started
            .errs()
            .iter()
            .map(|e| {
                std::error::Error::source(e.as_ref())
                    .expect("cause")
                    .to_string()
            })
            .collect();
        assert_eq!(messages, vec!["E1".to_string(), "E2".to_string()]);
    }

    #[tokio::test]
    async fn empty_parent_finishes_immediately() {
        let started = Parent::new(Vec::new()).start();
        started.close();
        started.done().await;
        assert!(started.errs().is_empty());
    }
}
