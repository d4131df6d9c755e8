//! Source and destination dataset pairs of a run.

use std::fmt;

use engine::capability::TransferFeatures;
use engine::{Dataset, ReplicationPolicy};
use filters::SnapshotFilter;
use tracing::debug;

use crate::error::ClientError;
use crate::repository::Repository;

/// One source dataset and the destination it replicates into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetPair {
    /// Dataset snapshots are read from.
    pub source: Dataset,
    /// Dataset snapshots are received into.
    pub destination: Dataset,
    /// The pair stands for a whole recursive tree sent as stream packages.
    pub stream_package: bool,
}

impl fmt::Display for DatasetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Lists the pairs to replicate, parents before children.
///
/// A recursive run that may delete, has no filter and can use stream
/// packages is a single pair: the packages carry every descendant. Any other
/// recursive run pairs each source descendant with the same relative name
/// below `destination`.
///
/// # Errors
///
/// Fails when the source tree cannot be listed or a descendant name cannot
/// be mapped onto the destination.
pub fn dataset_pairs<R>(
    repository: &mut R,
    source: &Dataset,
    destination: &Dataset,
    policy: &ReplicationPolicy,
    filter: Option<&SnapshotFilter>,
    features: &TransferFeatures,
) -> Result<Vec<DatasetPair>, ClientError>
where
    R: Repository + ?Sized,
{
    let root = |stream_package| DatasetPair {
        source: source.clone(),
        destination: destination.clone(),
        stream_package,
    };

    if !policy.recursive() {
        return Ok(vec![root(false)]);
    }
    if features.stream_package && policy.delete() && filter.is_none() {
        debug!(target: "zrsync::plan", "{source}: replicating the tree as stream packages");
        return Ok(vec![root(true)]);
    }

    let descendants = repository.list_datasets(source).map_err(|error| {
        if error.is_not_found() {
            ClientError::SourceMissing(source.to_string())
        } else {
            ClientError::from(error)
        }
    })?;

    let mut pairs = Vec::with_capacity(descendants.len());
    for dataset in descendants {
        let Some(relative) = dataset.relative_to(source) else {
            continue;
        };
        let target = destination
            .join(relative)
            .map_err(|error| ClientError::InvalidDataset {
                role: "destination",
                source: error,
            })?;
        pairs.push(DatasetPair {
            source: dataset,
            destination: target,
            stream_package: false,
        });
    }
    debug!(target: "zrsync::plan", "{source}: {} datasets to replicate", pairs.len());
    Ok(pairs)
}
