use std::fmt;

use crate::dataset::Dataset;

/// When a deletion step runs relative to the transfers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DeleteTiming {
    /// Before any transfer (`--delete-before`).
    Before,
    /// After all transfers.
    After,
}

impl fmt::Display for DeleteTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
        })
    }
}

/// One snapshot transfer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferStep {
    /// Incremental base; `None` for a full send.
    pub from: Option<String>,
    /// Snapshot to send.
    pub to: String,
    /// Send as a replication package that force-matches the destination.
    pub whole_stream: bool,
}

impl TransferStep {
    /// Returns `true` for the full send that starts a destination's history.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.from.is_none()
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.whole_stream { "stream package" } else { "send" };
        match &self.from {
            Some(from) => write!(f, "{kind} {from} -> {}", self.to),
            None => write!(f, "full {kind} {}", self.to),
        }
    }
}

/// An action in a [`Plan`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanStep {
    /// Continue an interrupted receive from its token.
    ResumeSend {
        /// Opaque resume token reported by the destination.
        token: String,
    },
    /// Discard an interrupted receive the source cannot continue.
    ResumeAbort,
    /// Destroy the destination dataset and its descendants.
    DestroyAll {
        /// Dataset to destroy.
        dataset: Dataset,
    },
    /// Send one snapshot, fully or incrementally.
    Transfer(TransferStep),
    /// Destroy destination snapshots.
    Delete {
        /// Snapshot names in destination order.
        snapshots: Vec<String>,
        /// When the deletion runs.
        timing: DeleteTiming,
    },
}

impl PlanStep {
    /// Returns `true` for steps that remove data from the destination.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::ResumeAbort | Self::DestroyAll { .. } | Self::Delete { .. }
        )
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResumeSend { .. } => f.write_str("resume interrupted send"),
            Self::ResumeAbort => f.write_str("abort interrupted receive"),
            Self::DestroyAll { dataset } => write!(f, "destroy {dataset}"),
            Self::Transfer(transfer) => transfer.fmt(f),
            Self::Delete { snapshots, timing } => {
                write!(f, "delete {} snapshot(s) {timing} transfer", snapshots.len())
            }
        }
    }
}

/// Ordered steps reconciling one dataset pair.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    /// Wraps already ordered steps.
    #[must_use]
    pub const fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` when there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates over the transfer steps only.
    pub fn transfers(&self) -> impl Iterator<Item = &TransferStep> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Transfer(transfer) => Some(transfer),
            _ => None,
        })
    }
}

impl IntoIterator for Plan {
    type Item = PlanStep;
    type IntoIter = std::vec::IntoIter<PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
