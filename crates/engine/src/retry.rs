//! Retry classification for one dataset pair.
//!
//! Each attempt counts the steps it completed. A failure after progress means
//! the listings changed under the plan, so the pair is replanned from fresh
//! state. A failure without progress would fail the same way again and ends
//! the pair.

/// Result of one attempt at a dataset pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttemptOutcome {
    /// Every step succeeded.
    Success,
    /// A step failed after at least one success; replan and try again.
    PartialRetry,
    /// A step failed before anything succeeded.
    Fatal,
}

/// Progress of the current attempt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Attempt {
    completed: usize,
}

impl Attempt {
    /// Starts an attempt with no progress.
    #[must_use]
    pub const fn new() -> Self {
        Self { completed: 0 }
    }

    /// Records a successful step.
    pub const fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Returns the number of successful steps.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Classifies a step failure at this point of the attempt.
    #[must_use]
    pub const fn on_failure(&self) -> AttemptOutcome {
        if self.completed > 0 {
            AttemptOutcome::PartialRetry
        } else {
            AttemptOutcome::Fatal
        }
    }
}
