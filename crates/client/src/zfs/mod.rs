//! [`Repository`] backed by the `zfs` and `zpool` programs.

mod commands;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use engine::capability::{Capability, classify_probe};
use engine::resume::token_from_property;
use engine::signatures::{BENIGN_RECEIVE, DATASET_NOT_FOUND, NOTHING_TO_DESTROY, has_signature};
use engine::{Dataset, destroy_batches};
use tracing::info;
use transport::{CommandOutput, CommandRunner, CommandSpec, Invocation, StreamSide};

use crate::repository::{Repository, RepositoryError, StepOutcome, TransferRequest};

/// Talks to the snapshot engine through a [`CommandRunner`].
///
/// Every command runs on the host of the dataset it concerns, so a transfer
/// between two remote endpoints pipes the sender's output through this
/// machine.
#[derive(Debug)]
pub struct ZfsRepository<R> {
    runner: R,
}

impl<R: CommandRunner> ZfsRepository<R> {
    /// Wraps `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Unwraps the runner.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.runner
    }

    fn run(&mut self, host: &str, spec: CommandSpec) -> Result<(Invocation, CommandOutput), RepositoryError> {
        let invocation = Invocation::new(host, spec);
        let output = self.runner.run(&invocation)?;
        Ok((invocation, output))
    }

    /// Runs a query about `dataset` and returns its standard output.
    fn query(&mut self, dataset: &Dataset, spec: CommandSpec) -> Result<String, RepositoryError> {
        let (invocation, output) = self.run(dataset.host(), spec)?;
        if output.succeeded() {
            return Ok(output.stdout);
        }
        Err(failure(dataset, &invocation, &output))
    }

    fn property_pairs(
        &mut self,
        host: &str,
        spec: CommandSpec,
        subject: Option<&Dataset>,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        let (invocation, output) = self.run(host, spec)?;
        if !output.succeeded() {
            return Err(match subject {
                Some(dataset) => failure(dataset, &invocation, &output),
                None => command_failed(&invocation, &output),
            });
        }
        output
            .stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once('\t')
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .ok_or_else(|| RepositoryError::Malformed {
                        command: invocation.to_string(),
                        detail: format!("expected 'property<TAB>value', got '{line}'"),
                    })
            })
            .collect()
    }
}

fn command_failed(invocation: &Invocation, output: &CommandOutput) -> RepositoryError {
    RepositoryError::CommandFailed {
        command: invocation.to_string(),
        diagnostic: output.stderr.trim().to_owned(),
    }
}

fn failure(dataset: &Dataset, invocation: &Invocation, output: &CommandOutput) -> RepositoryError {
    if has_signature(&output.stderr, DATASET_NOT_FOUND) {
        RepositoryError::NotFound {
            dataset: dataset.to_string(),
        }
    } else {
        command_failed(invocation, output)
    }
}

fn relay(side: StreamSide, line: &str) {
    if !line.trim().is_empty() {
        info!(target: "zrsync::stream", "{}: {line}", side.label());
    }
}

impl<R: CommandRunner> Repository for ZfsRepository<R> {
    fn list_snapshots(&mut self, dataset: &Dataset) -> Result<Vec<String>, RepositoryError> {
        let spec = commands::list_snapshots(dataset);
        let command = spec.to_string();
        let stdout = self.query(dataset, spec)?;
        let mut names = stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once('@')
                    .map(|(_, name)| name.to_owned())
                    .ok_or_else(|| RepositoryError::Malformed {
                        command: command.clone(),
                        detail: format!("'{line}' is not a snapshot name"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        names.reverse();
        Ok(names)
    }

    fn list_datasets(&mut self, root: &Dataset) -> Result<Vec<Dataset>, RepositoryError> {
        let spec = commands::list_datasets(root);
        let command = spec.to_string();
        let stdout = self.query(root, spec)?;
        stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                Dataset::new(root.host(), line).map_err(|error| RepositoryError::Malformed {
                    command: command.clone(),
                    detail: error.to_string(),
                })
            })
            .collect()
    }

    fn get_property(
        &mut self,
        dataset: &Dataset,
        name: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let stdout = self.query(dataset, commands::get_property(dataset, name))?;
        let value = stdout.trim();
        Ok((!value.is_empty() && value != "-").then(|| value.to_owned()))
    }

    fn local_properties(
        &mut self,
        dataset: &Dataset,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        self.property_pairs(
            dataset.host(),
            commands::local_properties(dataset),
            Some(dataset),
        )
    }

    fn pool_properties(
        &mut self,
        host: &str,
        pool: &str,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        self.property_pairs(host, commands::pool_properties(pool), None)
    }

    fn probe(&mut self, host: &str, capability: Capability) -> Result<bool, RepositoryError> {
        let (_, output) = self.run(host, commands::probe(capability))?;
        let mut text = output.stderr;
        text.push_str(&output.stdout);
        Ok(classify_probe(&text))
    }

    fn resume_token(&mut self, dataset: &Dataset) -> Result<Option<String>, RepositoryError> {
        match self.query(dataset, commands::resume_token(dataset)) {
            Ok(stdout) => Ok(token_from_property(Some(&stdout)).map(str::to_owned)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn transfer(&mut self, request: &TransferRequest) -> Result<StepOutcome, RepositoryError> {
        let sender = Invocation::new(request.source.host(), commands::send(request));

        if request.dry_run {
            let output = self.runner.run(&sender)?;
            for line in output.stdout.lines().chain(output.stderr.lines()) {
                relay(StreamSide::Sender, line);
            }
            let mut diagnostic = output.stderr;
            diagnostic.push_str(&output.stdout);
            return Ok(if output.status.success {
                StepOutcome::success(diagnostic)
            } else {
                StepOutcome::failure(diagnostic)
            });
        }

        let receiver = Invocation::new(request.destination.host(), commands::receive(request));
        let output = self.runner.pipe(&sender, &receiver, &mut relay)?;
        let diagnostic = output.combined_transcript();

        if output.succeeded() {
            return Ok(StepOutcome::success(diagnostic));
        }
        if output.sender.success && has_signature(&output.receiver_transcript, BENIGN_RECEIVE) {
            return Ok(StepOutcome {
                succeeded: false,
                benign_failure: true,
                diagnostic,
            });
        }
        Ok(StepOutcome::failure(diagnostic))
    }

    fn destroy_dataset(
        &mut self,
        dataset: &Dataset,
        recursive: bool,
        dry_run: bool,
    ) -> Result<(), RepositoryError> {
        let stdout = self.query(dataset, commands::destroy_dataset(dataset, recursive, dry_run))?;
        for line in stdout.lines() {
            relay(StreamSide::Receiver, line);
        }
        Ok(())
    }

    fn destroy_snapshots(
        &mut self,
        dataset: &Dataset,
        names: &[String],
        dry_run: bool,
    ) -> Result<(), RepositoryError> {
        for batch in destroy_batches(names) {
            let spec = commands::destroy_snapshots(dataset, batch, dry_run);
            let (invocation, output) = self.run(dataset.host(), spec)?;
            for line in output.stdout.lines() {
                relay(StreamSide::Receiver, line);
            }
            if !output.succeeded() && !has_signature(&output.stderr, NOTHING_TO_DESTROY) {
                return Err(command_failed(&invocation, &output));
            }
        }
        Ok(())
    }

    fn abort_pending_receive(&mut self, dataset: &Dataset) -> Result<(), RepositoryError> {
        self.query(dataset, commands::abort_receive(dataset))?;
        Ok(())
    }
}
