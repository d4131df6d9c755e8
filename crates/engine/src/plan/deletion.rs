//! Deletion candidates.

use std::collections::BTreeSet;

use filters::{SnapshotFilter, allows};

use crate::policy::ReplicationPolicy;
use crate::snapshot::SnapshotSet;

/// Destination snapshots that the source no longer justifies keeping.
///
/// The pool is the destination listing minus names already consumed by an
/// earlier step, restricted to filter-matching names unless
/// `delete_excluded` is set. Anything in the pool that is not an eligible
/// source snapshot is a candidate. Destination order is preserved.
pub(super) fn deletion_candidates<'a>(
    destination: &'a SnapshotSet,
    filtered_source: &[&str],
    filter: Option<&SnapshotFilter>,
    policy: &ReplicationPolicy,
    consumed: &BTreeSet<String>,
) -> Vec<&'a str> {
    destination
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| !consumed.contains(*name))
        .filter(|name| policy.delete_excluded() || allows(filter, name))
        .filter(|name| !filtered_source.contains(name))
        .collect()
}
