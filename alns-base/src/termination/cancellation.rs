#[cfg(test)]
#[path = "../../tests/unit/termination/cancellation_test.rs"]
mod cancellation_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A cooperative cancellation signal polled by long running loops.
///
/// Tokens form a tree: cancelling a parent cancels all its children, a child cannot cancel
/// its parent. A deadline is inherited and can only be shortened by children.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    flags: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a new root token without deadline.
    pub fn new() -> Self {
        Self { flags: vec![Arc::new(AtomicBool::new(false))], deadline: None }
    }

    /// Creates a new root token which is cancelled after given duration.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().child_with_deadline(Instant::now().checked_add(timeout))
    }

    /// Creates a child token which can be cancelled independently.
    pub fn child(&self) -> Self {
        self.child_with_deadline(None)
    }

    /// Creates a child token which is additionally cancelled after given duration.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        self.child_with_deadline(Instant::now().checked_add(timeout))
    }

    fn child_with_deadline(&self, deadline: Option<Instant>) -> Self {
        let flags = self.flags.iter().cloned().chain(std::iter::once(Arc::new(AtomicBool::new(false)))).collect();
        let deadline = match (self.deadline, deadline) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (left, right) => left.or(right),
        };

        Self { flags, deadline }
    }

    /// Cancels this token and all its children.
    pub fn cancel(&self) {
        if let Some(flag) = self.flags.last() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Returns true if this token or any of its ancestors is cancelled or deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
            || self.flags.iter().any(|flag| flag.load(Ordering::Relaxed))
    }

    /// Returns remaining time till deadline, if any.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
