//! Recognized diagnostic signatures.
//!
//! The snapshot engine reports most conditions only as human readable text on
//! standard error. Each table lists the substrings that identify one class of
//! message; [`has_signature`] performs a case-insensitive search.

/// Output of a capability probe meaning the flag is unknown.
pub const UNSUPPORTED_OPTION: &[&str] = &["invalid option", "illegal option", "unrecognized option"];

/// Receive-side messages printed after the data itself was received.
///
/// The dataset is complete and consistent; only mounting or sharing failed.
pub const BENIGN_RECEIVE: &[&str] = &[
    "filesystem successfully created, but it may only be mounted by root",
    "filesystem successfully created, but not shared",
    "share operation failed",
    "cannot share",
];

/// Messages showing that a resume token can no longer be used.
pub const RESUME_FAILURE: &[&str] = &[
    "cannot resume send",
    "resume token is corrupt",
    "used in the initial send no longer exists",
    "incremental source",
    "kernel modules must be upgraded to receive this stream",
];

/// Messages showing the dataset does not exist.
pub const DATASET_NOT_FOUND: &[&str] = &["dataset does not exist"];

/// Message printed by a destroy whose snapshots were already gone.
pub const NOTHING_TO_DESTROY: &[&str] = &["could not find any snapshots to destroy"];

/// Returns `true` when `text` contains any entry of `table`.
#[must_use]
pub fn has_signature(text: &str, table: &[&str]) -> bool {
    let text = text.to_ascii_lowercase();
    table.iter().any(|signature| text.contains(signature))
}
