//! Snapshot listing.

use engine::{Dataset, SnapshotSet};
use tracing::trace;

use crate::repository::{Repository, RepositoryError};

/// Fetches the snapshots of `dataset`, newest first.
///
/// A dataset that does not exist yields an absent, empty set.
///
/// # Errors
///
/// Propagates every repository failure other than a missing dataset.
pub fn snapshot_set<R>(repository: &mut R, dataset: &Dataset) -> Result<SnapshotSet, RepositoryError>
where
    R: Repository + ?Sized,
{
    match repository.list_snapshots(dataset) {
        Ok(names) => {
            trace!(target: "zrsync::plan", "{dataset}: {} snapshots", names.len());
            Ok(SnapshotSet::new(dataset.clone(), names))
        }
        Err(error) if error.is_not_found() => {
            trace!(target: "zrsync::plan", "{dataset}: does not exist");
            Ok(SnapshotSet::absent(dataset.clone()))
        }
        Err(error) => Err(error),
    }
}
