//! The snapshot engine seam.

use std::collections::BTreeMap;

use engine::Dataset;
use engine::capability::Capability;
use thiserror::Error;
use transport::CommandError;

/// Errors reported by a [`Repository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The dataset does not exist.
    #[error("dataset {dataset} does not exist")]
    NotFound {
        /// Dataset that was looked up.
        dataset: String,
    },
    /// A command ran and failed.
    #[error("'{command}' failed: {diagnostic}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// What the command printed.
        diagnostic: String,
    },
    /// A command printed something that could not be interpreted.
    #[error("unexpected output from '{command}': {detail}")]
    Malformed {
        /// Rendered command line.
        command: String,
        /// What was wrong.
        detail: String,
    },
    /// A command could not be run at all.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl RepositoryError {
    /// Returns `true` for [`RepositoryError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Flags for the sending side of a transfer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SendOptions {
    /// `-L`.
    pub large_blocks: bool,
    /// `-e`.
    pub embedded: bool,
    /// `-c`.
    pub compressed: bool,
    /// `-p`.
    pub properties: bool,
    /// `-R` with `-I` for incrementals.
    pub replicate: bool,
}

/// Flags for the receiving side of a transfer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReceiveOptions {
    /// `-F`: roll back and force-match the stream.
    pub force: bool,
    /// `-s`: keep partial state for resuming.
    pub resumable: bool,
    /// `-u`: do not mount.
    pub no_mount: bool,
    /// `-x name` per entry.
    pub excludes: Vec<String>,
    /// `-o name=value` per entry.
    pub overrides: Vec<(String, String)>,
}

/// What a transfer sends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransferStream {
    /// A snapshot, fully or incrementally.
    Snapshot {
        /// Incremental base.
        from: Option<String>,
        /// Snapshot to send.
        to: String,
    },
    /// The remainder of an interrupted transfer.
    Resume {
        /// Resume token reported by the destination.
        token: String,
    },
}

/// A fully specified send/receive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferRequest {
    /// Sending dataset.
    pub source: Dataset,
    /// Receiving dataset.
    pub destination: Dataset,
    /// What to send.
    pub stream: TransferStream,
    /// Sending flags.
    pub send: SendOptions,
    /// Receiving flags.
    pub receive: ReceiveOptions,
    /// Only estimate the send; nothing is received.
    pub dry_run: bool,
}

/// Aggregate result of a transfer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StepOutcome {
    /// Both sides exited successfully.
    pub succeeded: bool,
    /// The sender succeeded and the receiver only reported a mount or share
    /// problem after receiving everything.
    pub benign_failure: bool,
    /// Diagnostic text of both sides.
    pub diagnostic: String,
}

impl StepOutcome {
    /// Outcome of a transfer that completed.
    #[must_use]
    pub fn success(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            benign_failure: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// Outcome of a failed transfer.
    #[must_use]
    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            benign_failure: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// Returns `true` when the destination received the data.
    #[must_use]
    pub const fn is_effective_success(&self) -> bool {
        self.succeeded || self.benign_failure
    }
}

/// Operations the replication client needs from the snapshot engine.
pub trait Repository {
    /// Lists the snapshots of `dataset`, newest first.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when the dataset does not exist.
    fn list_snapshots(&mut self, dataset: &Dataset) -> Result<Vec<String>, RepositoryError>;

    /// Lists `root` and all its descendants, parents before children.
    ///
    /// # Errors
    ///
    /// Fails when the listing command fails.
    fn list_datasets(&mut self, root: &Dataset) -> Result<Vec<Dataset>, RepositoryError>;

    /// Reads one property; `None` when it is unset.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when the dataset does not exist.
    fn get_property(&mut self, dataset: &Dataset, name: &str)
    -> Result<Option<String>, RepositoryError>;

    /// Reads the properties set locally on `dataset`.
    ///
    /// # Errors
    ///
    /// Fails when the dataset does not exist or the query fails.
    fn local_properties(
        &mut self,
        dataset: &Dataset,
    ) -> Result<BTreeMap<String, String>, RepositoryError>;

    /// Reads every property of `pool` on `host`.
    ///
    /// # Errors
    ///
    /// Fails when the pool does not exist or the query fails.
    fn pool_properties(
        &mut self,
        host: &str,
        pool: &str,
    ) -> Result<BTreeMap<String, String>, RepositoryError>;

    /// Reports whether `host` understands `capability`.
    ///
    /// # Errors
    ///
    /// Fails only when the probe cannot be run at all.
    fn probe(&mut self, host: &str, capability: Capability) -> Result<bool, RepositoryError>;

    /// Returns the pending resume token of `dataset`, if any.
    ///
    /// # Errors
    ///
    /// Fails when the query fails for a reason other than a missing dataset.
    fn resume_token(&mut self, dataset: &Dataset) -> Result<Option<String>, RepositoryError>;

    /// Runs a transfer.
    ///
    /// A transfer that runs and fails is reported through
    /// [`StepOutcome::succeeded`], not as an error.
    ///
    /// # Errors
    ///
    /// Fails when the transfer cannot be started.
    fn transfer(&mut self, request: &TransferRequest) -> Result<StepOutcome, RepositoryError>;

    /// Destroys `dataset`, with its descendants when `recursive`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when the dataset does not exist,
    /// [`RepositoryError::CommandFailed`] when the destroy fails.
    fn destroy_dataset(
        &mut self,
        dataset: &Dataset,
        recursive: bool,
        dry_run: bool,
    ) -> Result<(), RepositoryError>;

    /// Destroys snapshots of `dataset`. Snapshots that are already gone are
    /// not an error.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::CommandFailed`] when a destroy fails.
    fn destroy_snapshots(
        &mut self,
        dataset: &Dataset,
        names: &[String],
        dry_run: bool,
    ) -> Result<(), RepositoryError>;

    /// Discards the partial receive state of `dataset`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::CommandFailed`] when the abort fails.
    fn abort_pending_receive(&mut self, dataset: &Dataset) -> Result<(), RepositoryError>;
}
