//! Counters reported at the end of a run.
//!
//! [`ReplicationSummary`] accumulates what the executor, resume resolver and
//! retry coordinator did, per pair and for the whole run, and renders the
//! end-of-run statistics line.

use std::fmt;

/// What a replication run did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplicationSummary {
    pairs: usize,
    transfers: usize,
    resumed: usize,
    deleted_snapshots: usize,
    destroyed_datasets: usize,
    aborted_receives: usize,
    retries: usize,
}

impl ReplicationSummary {
    /// Returns the number of dataset pairs brought up to date.
    #[must_use]
    pub const fn pairs(&self) -> usize {
        self.pairs
    }

    /// Returns the number of snapshot transfers that completed.
    #[must_use]
    pub const fn transfers(&self) -> usize {
        self.transfers
    }

    /// Returns the number of interrupted receives that were continued.
    #[must_use]
    pub const fn resumed(&self) -> usize {
        self.resumed
    }

    /// Returns the number of destination snapshots destroyed.
    #[must_use]
    pub const fn deleted_snapshots(&self) -> usize {
        self.deleted_snapshots
    }

    /// Returns the number of destination datasets destroyed to restart
    /// their history.
    #[must_use]
    pub const fn destroyed_datasets(&self) -> usize {
        self.destroyed_datasets
    }

    /// Returns the number of interrupted receives that were discarded.
    #[must_use]
    pub const fn aborted_receives(&self) -> usize {
        self.aborted_receives
    }

    /// Returns the number of times a pair was replanned after a failure.
    #[must_use]
    pub const fn retries(&self) -> usize {
        self.retries
    }

    pub(crate) const fn record_pair(&mut self) {
        self.pairs += 1;
    }

    pub(crate) const fn record_transfer(&mut self) {
        self.transfers += 1;
    }

    pub(crate) const fn record_resume(&mut self) {
        self.resumed += 1;
    }

    pub(crate) const fn record_deleted(&mut self, count: usize) {
        self.deleted_snapshots += count;
    }

    pub(crate) const fn record_destroyed_dataset(&mut self) {
        self.destroyed_datasets += 1;
    }

    pub(crate) const fn record_abort(&mut self) {
        self.aborted_receives += 1;
    }

    pub(crate) const fn record_retry(&mut self) {
        self.retries += 1;
    }

    /// Adds the counters of `other`.
    pub const fn merge(&mut self, other: &Self) {
        self.pairs += other.pairs;
        self.transfers += other.transfers;
        self.resumed += other.resumed;
        self.deleted_snapshots += other.deleted_snapshots;
        self.destroyed_datasets += other.destroyed_datasets;
        self.aborted_receives += other.aborted_receives;
        self.retries += other.retries;
    }
}

impl fmt::Display for ReplicationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} datasets, {} snapshots sent, {} resumed, {} snapshots deleted, {} datasets destroyed, {} receives aborted, {} retries",
            self.pairs,
            self.transfers,
            self.resumed,
            self.deleted_snapshots,
            self.destroyed_datasets,
            self.aborted_receives,
            self.retries
        )
    }
}
