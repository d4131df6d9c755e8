//! Capability probing with per-host caches.

use std::collections::{BTreeMap, HashMap};

use engine::Dataset;
use engine::capability::{
    Capability, NegotiationInputs, PoolFeature, TransferFeatures, pool_feature_enabled,
};
use tracing::debug;

use crate::repository::{Repository, RepositoryError};

/// Probes endpoints once per host and pool, then reuses the answers.
#[derive(Clone, Debug, Default)]
pub struct FeatureNegotiator {
    capabilities: HashMap<(String, Capability), bool>,
    pools: HashMap<(String, String), BTreeMap<String, String>>,
}

impl FeatureNegotiator {
    /// Creates a negotiator with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether `host` understands `capability`.
    ///
    /// # Errors
    ///
    /// Fails when the probe cannot be run.
    pub fn supports<R>(
        &mut self,
        repository: &mut R,
        host: &str,
        capability: Capability,
    ) -> Result<bool, RepositoryError>
    where
        R: Repository + ?Sized,
    {
        let key = (host.to_owned(), capability);
        if let Some(&supported) = self.capabilities.get(&key) {
            return Ok(supported);
        }
        let supported = repository.probe(host, capability)?;
        debug!(
            target: "zrsync::probe",
            "{}: {capability} {}",
            host_name(host),
            if supported { "supported" } else { "unsupported" }
        );
        self.capabilities.insert(key, supported);
        Ok(supported)
    }

    /// Reports whether `feature` is enabled or active on the pool of
    /// `dataset`.
    ///
    /// # Errors
    ///
    /// Fails when the pool properties cannot be read.
    pub fn pool_feature<R>(
        &mut self,
        repository: &mut R,
        dataset: &Dataset,
        feature: PoolFeature,
    ) -> Result<bool, RepositoryError>
    where
        R: Repository + ?Sized,
    {
        let key = (dataset.host().to_owned(), dataset.pool().to_owned());
        if !self.pools.contains_key(&key) {
            let properties = repository.pool_properties(&key.0, &key.1)?;
            self.pools.insert(key.clone(), properties);
        }
        let value = self
            .pools
            .get(&key)
            .and_then(|properties| properties.get(feature.property()))
            .map(String::as_str);
        let enabled = pool_feature_enabled(value);
        debug!(
            target: "zrsync::probe",
            "{}: pool {} {} = {}",
            host_name(dataset.host()),
            dataset.pool(),
            feature.property(),
            value.unwrap_or("-")
        );
        Ok(enabled)
    }

    /// Works out the transfer features shared by `source` and `destination`.
    ///
    /// # Errors
    ///
    /// Fails when a probe or pool query cannot be run.
    pub fn negotiate<R>(
        &mut self,
        repository: &mut R,
        source: &Dataset,
        destination: &Dataset,
    ) -> Result<TransferFeatures, RepositoryError>
    where
        R: Repository + ?Sized,
    {
        let sender = source.host();
        let receiver = destination.host();
        let inputs = NegotiationInputs {
            source_large_blocks: self.supports(repository, sender, Capability::SendLargeBlocks)?,
            source_embedded: self.supports(repository, sender, Capability::SendEmbedded)?,
            source_compressed: self.supports(repository, sender, Capability::SendCompressed)?,
            source_replication_package: self.supports(
                repository,
                sender,
                Capability::SendReplicationPackage,
            )?,
            destination_resumable: self.supports(repository, receiver, Capability::ReceiveResumable)?,
            destination_pool_large_blocks: self.pool_feature(
                repository,
                destination,
                PoolFeature::LargeBlocks,
            )?,
            source_pool_embedded: self.pool_feature(repository, source, PoolFeature::EmbeddedData)?,
            destination_pool_embedded: self.pool_feature(
                repository,
                destination,
                PoolFeature::EmbeddedData,
            )?,
        };
        let features = TransferFeatures::negotiate(&inputs);
        debug!(target: "zrsync::probe", "negotiated {features:?}");
        Ok(features)
    }
}

fn host_name(host: &str) -> &str {
    if host.is_empty() { "localhost" } else { host }
}
