//! Planning failures.

use thiserror::Error;

/// Reasons the planner refuses to produce a plan.
///
/// Each variant is a precondition that only an explicit policy change can
/// lift; none of them is retried.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PlanError {
    /// Source and destination share no snapshot and deletion was not allowed.
    #[error(
        "destination {destination} has snapshots but none in common with the source; \
         use --delete to replace them"
    )]
    NoCommonHistory {
        /// Destination dataset.
        destination: String,
    },
    /// A full resync would destroy destination snapshots outside the filter.
    #[error(
        "destination {destination} has snapshots excluded by the filter ({}); \
         use --delete-excluded to allow destroying them",
        .names.join(", ")
    )]
    ExcludedSnapshotsWouldBeDestroyed {
        /// Destination dataset.
        destination: String,
        /// Snapshot names that would be lost.
        names: Vec<String>,
    },
    /// An encrypted source would be stored unencrypted.
    #[error(
        "refusing to replicate encrypted source {source_dataset} to unencrypted destination {destination}"
    )]
    EncryptionDowngrade {
        /// Source dataset.
        source_dataset: String,
        /// Destination dataset.
        destination: String,
    },
}
