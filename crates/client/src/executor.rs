//! Carries out plan steps against a repository.

use engine::{Dataset, EncryptionRules, PlanStep, TransferStep};
use tracing::{debug, info, warn};

use crate::options::OptionSet;
use crate::repository::{
    Repository, RepositoryError, SendOptions, StepOutcome, TransferRequest, TransferStream,
};
use crate::summary::ReplicationSummary;

/// Result of one executed step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepStatus {
    /// The step took effect.
    Completed,
    /// The step ran and failed.
    Failed {
        /// What the commands printed.
        diagnostic: String,
    },
}

impl StepStatus {
    /// Returns `true` for [`StepStatus::Completed`].
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Executes the steps of one dataset pair.
///
/// Tracks whether the destination exists so a full receive into a dataset
/// that is still there is forced.
#[derive(Debug)]
pub struct StepExecutor<'a> {
    source: &'a Dataset,
    destination: &'a Dataset,
    options: &'a OptionSet,
    rules: EncryptionRules,
    destination_exists: bool,
    dry_run: bool,
}

impl<'a> StepExecutor<'a> {
    /// Creates an executor for `source -> destination`.
    #[must_use]
    pub fn new(
        source: &'a Dataset,
        destination: &'a Dataset,
        options: &'a OptionSet,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            destination,
            options,
            rules: EncryptionRules::default(),
            destination_exists: true,
            dry_run,
        }
    }

    /// Applies encryption rules to the transfers that follow.
    #[must_use]
    pub fn with_rules(mut self, rules: EncryptionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Records whether the destination dataset exists.
    ///
    /// A full stream received into an existing dataset is forced, which
    /// discards whatever the dataset holds that was never snapshotted. The
    /// executor warns before doing so.
    #[must_use]
    pub const fn with_destination_exists(mut self, exists: bool) -> Self {
        self.destination_exists = exists;
        self
    }

    /// Runs `step`, counting what it did in `summary`.
    ///
    /// A step that runs and fails is reported as [`StepStatus::Failed`].
    ///
    /// # Errors
    ///
    /// Fails when a command cannot be started or its output cannot be
    /// understood.
    pub fn execute<R>(
        &mut self,
        repository: &mut R,
        step: &PlanStep,
        summary: &mut ReplicationSummary,
    ) -> Result<StepStatus, RepositoryError>
    where
        R: Repository + ?Sized,
    {
        match step {
            PlanStep::ResumeSend { token } => {
                info!(target: "zrsync::resume", "{}: resuming interrupted receive", self.destination);
                let request = TransferRequest {
                    source: self.source.clone(),
                    destination: self.destination.clone(),
                    stream: TransferStream::Resume {
                        token: token.clone(),
                    },
                    send: SendOptions::default(),
                    receive: self.options.resume_receive_options(),
                    dry_run: self.dry_run,
                };
                let status = self.transfer(repository, &request)?;
                if status.is_completed() {
                    summary.record_resume();
                }
                Ok(status)
            }
            PlanStep::ResumeAbort => {
                if self.dry_run {
                    info!(
                        target: "zrsync::resume",
                        "{}: would discard interrupted receive",
                        self.destination
                    );
                    return Ok(StepStatus::Completed);
                }
                info!(target: "zrsync::resume", "{}: discarding interrupted receive", self.destination);
                let status = completed(repository.abort_pending_receive(self.destination))?;
                if status.is_completed() {
                    summary.record_abort();
                }
                Ok(status)
            }
            PlanStep::DestroyAll { dataset } => {
                info!(
                    target: "zrsync::del",
                    "{dataset}: destroying to restart its history from the source"
                );
                match repository.destroy_dataset(dataset, true, self.dry_run) {
                    Ok(()) => summary.record_destroyed_dataset(),
                    Err(error) if error.is_not_found() => {
                        debug!(target: "zrsync::del", "{dataset}: already gone");
                    }
                    Err(error) => return completed(Err(error)),
                }
                if !self.dry_run {
                    self.destination_exists = false;
                }
                Ok(StepStatus::Completed)
            }
            PlanStep::Transfer(transfer) => {
                self.log_transfer(transfer);
                if transfer.is_initial() && self.destination_exists {
                    warn!(
                        target: "zrsync::send",
                        "{}: existing dataset will be overwritten by a full stream",
                        self.destination
                    );
                }
                let request = TransferRequest {
                    source: self.source.clone(),
                    destination: self.destination.clone(),
                    stream: TransferStream::Snapshot {
                        from: transfer.from.clone(),
                        to: transfer.to.clone(),
                    },
                    send: self.options.send_options(&self.rules, transfer),
                    receive: self.options.receive_options(
                        &self.rules,
                        transfer,
                        self.destination_exists,
                    ),
                    dry_run: self.dry_run,
                };
                let status = self.transfer(repository, &request)?;
                if status.is_completed() {
                    summary.record_transfer();
                    if !self.dry_run {
                        self.destination_exists = true;
                    }
                }
                Ok(status)
            }
            PlanStep::Delete { snapshots, timing } => {
                info!(
                    target: "zrsync::del",
                    "{}: deleting {} snapshots ({timing} transfers)",
                    self.destination,
                    snapshots.len()
                );
                for name in snapshots {
                    debug!(target: "zrsync::del", "deleting {}", self.destination.snapshot(name));
                }
                let status = completed(repository.destroy_snapshots(
                    self.destination,
                    snapshots,
                    self.dry_run,
                ))?;
                if status.is_completed() {
                    summary.record_deleted(snapshots.len());
                }
                Ok(status)
            }
        }
    }

    fn log_transfer(&self, transfer: &TransferStep) {
        let to = self.source.snapshot(&transfer.to);
        match &transfer.from {
            Some(from) => info!(
                target: "zrsync::send",
                "{}{to} -> {} (incremental from {from}{})",
                host_prefix(self.source),
                self.destination,
                if transfer.whole_stream { ", stream package" } else { "" }
            ),
            None => info!(
                target: "zrsync::send",
                "{}{to} -> {} (full{})",
                host_prefix(self.source),
                self.destination,
                if transfer.whole_stream { ", stream package" } else { "" }
            ),
        }
    }

    fn transfer<R>(
        &self,
        repository: &mut R,
        request: &TransferRequest,
    ) -> Result<StepStatus, RepositoryError>
    where
        R: Repository + ?Sized,
    {
        let outcome: StepOutcome = repository.transfer(request)?;
        if outcome.succeeded {
            return Ok(StepStatus::Completed);
        }
        if outcome.benign_failure {
            warn!(
                target: "zrsync::send",
                "{}: received, but: {}",
                self.destination,
                outcome.diagnostic.trim()
            );
            return Ok(StepStatus::Completed);
        }
        Ok(StepStatus::Failed {
            diagnostic: outcome.diagnostic.trim().to_owned(),
        })
    }
}

fn host_prefix(dataset: &Dataset) -> String {
    if dataset.is_local() {
        String::new()
    } else {
        format!("{}:", dataset.host())
    }
}

/// Turns a failed command into [`StepStatus::Failed`] and keeps every other
/// error.
fn completed(result: Result<(), RepositoryError>) -> Result<StepStatus, RepositoryError> {
    match result {
        Ok(()) => Ok(StepStatus::Completed),
        Err(RepositoryError::CommandFailed { diagnostic, .. }) => {
            Ok(StepStatus::Failed { diagnostic })
        }
        Err(error) => Err(error),
    }
}
