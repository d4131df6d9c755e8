//! Entry points that run a whole replication.

use tracing::{debug, info};
use transport::ProcessRunner;

use crate::catalog::snapshot_set;
use crate::config::ClientConfig;
use crate::coordinator::RetryCoordinator;
use crate::error::ClientError;
use crate::negotiator::FeatureNegotiator;
use crate::options::OptionSet;
use crate::repository::Repository;
use crate::summary::ReplicationSummary;
use crate::walker::dataset_pairs;
use crate::zfs::ZfsRepository;

/// Runs the replication described by `config` against the real `zfs`
/// tooling, reaching remote hosts through the configured remote shell.
///
/// # Errors
///
/// Returns [`ClientError`] when the configuration is invalid, a pair is
/// refused or a step fails without progress.
pub fn run_client(config: &ClientConfig) -> Result<ReplicationSummary, ClientError> {
    config.validate()?;
    let runner = match config.remote_shell() {
        Some(spec) => ProcessRunner::with_remote_shell(spec).map_err(ClientError::RemoteShell)?,
        None => ProcessRunner::new(),
    };
    run_client_with(config, &mut ZfsRepository::new(runner))
}

/// Runs the replication described by `config` against `repository`.
///
/// Pairs are processed parents first; the first pair that fails ends the run.
///
/// # Errors
///
/// See [`run_client`].
pub fn run_client_with<R>(
    config: &ClientConfig,
    repository: &mut R,
) -> Result<ReplicationSummary, ClientError>
where
    R: Repository + ?Sized,
{
    config.validate()?;
    let source = config.source_dataset()?;
    let destination = config.destination_dataset()?;
    let policy = config.policy();

    if !snapshot_set(repository, &source)?.exists() {
        return Err(ClientError::SourceMissing(source.to_string()));
    }

    let mut negotiator = FeatureNegotiator::new();
    let features = negotiator.negotiate(repository, &source, &destination)?;
    debug!(target: "zrsync::probe", "{source} -> {destination}: {features:?}");
    let options = OptionSet::new(
        features,
        policy,
        config.property_overrides(),
        config.property_excludes(),
    );

    let pairs = dataset_pairs(
        repository,
        &source,
        &destination,
        policy,
        config.filter(),
        &features,
    )?;

    let mut summary = ReplicationSummary::default();
    for pair in &pairs {
        info!(target: "zrsync::misc", "replicating {pair}");
        let pair_summary = RetryCoordinator::new(pair, config, &options)
            .run(repository, &mut negotiator)?;
        summary.merge(&pair_summary);
    }

    info!(target: "zrsync::stats", "{summary}");
    Ok(summary)
}
