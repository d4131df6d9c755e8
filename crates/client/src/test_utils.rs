//! In-memory doubles for the snapshot engine and the command runner.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use engine::Dataset;
use engine::capability::Capability;
use transport::{
    CommandError, CommandOutput, CommandRunner, Invocation, PipelineOutput, ProcessStatus,
    StreamSide,
};

use crate::repository::{
    Repository, RepositoryError, StepOutcome, TransferRequest, TransferStream,
};

pub(crate) fn local(path: &str) -> Dataset {
    Dataset::local(path).expect("valid dataset")
}

pub(crate) fn remote(host: &str, path: &str) -> Dataset {
    Dataset::new(host, path).expect("valid dataset")
}

#[derive(Clone, Debug, Default)]
struct FakeDataset {
    /// Oldest first.
    snapshots: Vec<String>,
    properties: BTreeMap<String, String>,
    encryption: Option<String>,
    resume_token: Option<String>,
}

#[derive(Clone, Debug)]
struct PendingReceive {
    source: Dataset,
    from: Option<String>,
    to: String,
}

#[derive(Clone, Debug)]
enum Fault {
    Fail { diagnostic: String, once: bool },
    Interrupt { token: String },
    Benign { diagnostic: String },
}

/// A model of the snapshot engine with failure injection.
#[derive(Debug, Default)]
pub(crate) struct FakeZfs {
    datasets: BTreeMap<Dataset, FakeDataset>,
    pending: HashMap<String, PendingReceive>,
    unsupported: BTreeSet<(String, Capability)>,
    pools: HashMap<(String, String), BTreeMap<String, String>>,
    transfer_faults: HashMap<String, Fault>,
    resume_fault: Option<String>,
    destroy_fault: Option<String>,
    /// Every mutating operation, in order.
    pub(crate) events: Vec<String>,
    /// Every transfer request, in order.
    pub(crate) transfers: Vec<TransferRequest>,
    pub(crate) probes: usize,
}

impl FakeZfs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates `dataset` with `snapshots` given oldest first.
    pub(crate) fn with_dataset(mut self, dataset: &Dataset, snapshots: &[&str]) -> Self {
        self.datasets.insert(
            dataset.clone(),
            FakeDataset {
                snapshots: snapshots.iter().map(|name| (*name).to_owned()).collect(),
                ..FakeDataset::default()
            },
        );
        self
    }

    pub(crate) fn with_encryption(mut self, dataset: &Dataset, cipher: &str) -> Self {
        if let Some(entry) = self.datasets.get_mut(dataset) {
            entry.encryption = Some(cipher.to_owned());
        }
        self
    }

    pub(crate) fn with_local_property(mut self, dataset: &Dataset, name: &str, value: &str) -> Self {
        if let Some(entry) = self.datasets.get_mut(dataset) {
            entry.properties.insert(name.to_owned(), value.to_owned());
        }
        self
    }

    pub(crate) fn without_capability(mut self, host: &str, capability: Capability) -> Self {
        self.unsupported.insert((host.to_owned(), capability));
        self
    }

    pub(crate) fn with_pool_property(mut self, host: &str, pool: &str, name: &str, value: &str) -> Self {
        self.pools
            .entry((host.to_owned(), pool.to_owned()))
            .or_insert_with(default_pool_properties)
            .insert(name.to_owned(), value.to_owned());
        self
    }

    /// Leaves a partial receive of `source@to` on `destination`.
    pub(crate) fn with_pending_receive(
        mut self,
        destination: &Dataset,
        token: &str,
        source: &Dataset,
        from: Option<&str>,
        to: &str,
    ) -> Self {
        self.datasets.entry(destination.clone()).or_default().resume_token = Some(token.to_owned());
        self.pending.insert(
            token.to_owned(),
            PendingReceive {
                source: source.clone(),
                from: from.map(str::to_owned),
                to: to.to_owned(),
            },
        );
        self
    }

    /// Fails the next transfer of snapshot `to`.
    pub(crate) fn fail_transfer_once(mut self, to: &str, diagnostic: &str) -> Self {
        self.transfer_faults.insert(
            to.to_owned(),
            Fault::Fail {
                diagnostic: diagnostic.to_owned(),
                once: true,
            },
        );
        self
    }

    /// Fails every transfer of snapshot `to`.
    pub(crate) fn fail_transfer_always(mut self, to: &str, diagnostic: &str) -> Self {
        self.transfer_faults.insert(
            to.to_owned(),
            Fault::Fail {
                diagnostic: diagnostic.to_owned(),
                once: false,
            },
        );
        self
    }

    /// Interrupts the next transfer of `to`, leaving a resume token behind.
    pub(crate) fn interrupt_transfer(mut self, to: &str, token: &str) -> Self {
        self.transfer_faults.insert(
            to.to_owned(),
            Fault::Interrupt {
                token: token.to_owned(),
            },
        );
        self
    }

    /// Receives `to` but reports a mount problem.
    pub(crate) fn benign_failure_on(mut self, to: &str, diagnostic: &str) -> Self {
        self.transfer_faults.insert(
            to.to_owned(),
            Fault::Benign {
                diagnostic: diagnostic.to_owned(),
            },
        );
        self
    }

    pub(crate) fn fail_resume(mut self, diagnostic: &str) -> Self {
        self.resume_fault = Some(diagnostic.to_owned());
        self
    }

    pub(crate) fn fail_destroy(mut self, diagnostic: &str) -> Self {
        self.destroy_fault = Some(diagnostic.to_owned());
        self
    }

    /// Snapshots of `dataset`, oldest first; `None` when it does not exist.
    pub(crate) fn snapshots(&self, dataset: &Dataset) -> Option<Vec<&str>> {
        self.datasets
            .get(dataset)
            .map(|entry| entry.snapshots.iter().map(String::as_str).collect())
    }

    pub(crate) fn exists(&self, dataset: &Dataset) -> bool {
        self.datasets.contains_key(dataset)
    }

    pub(crate) fn token(&self, dataset: &Dataset) -> Option<&str> {
        self.datasets.get(dataset)?.resume_token.as_deref()
    }

    fn entry(&self, dataset: &Dataset) -> Result<&FakeDataset, RepositoryError> {
        self.datasets.get(dataset).ok_or_else(|| RepositoryError::NotFound {
            dataset: dataset.to_string(),
        })
    }

    fn descendants(&self, root: &Dataset) -> Vec<(Dataset, String)> {
        self.datasets
            .keys()
            .filter_map(|dataset| {
                dataset
                    .relative_to(root)
                    .map(|relative| (dataset.clone(), relative.to_owned()))
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn receive(
        &mut self,
        source: &Dataset,
        destination: &Dataset,
        from: Option<&str>,
        to: &str,
        replicate: bool,
        force: bool,
        descend: bool,
    ) -> Result<(), String> {
        let source_snapshots = self
            .datasets
            .get(source)
            .map(|entry| entry.snapshots.clone())
            .ok_or_else(|| format!("cannot open '{source}': dataset does not exist"))?;
        let to_index = source_snapshots
            .iter()
            .position(|name| name == to)
            .ok_or_else(|| format!("cannot open '{source}@{to}': dataset does not exist"))?;

        let received: Vec<String> = match from {
            None if replicate => source_snapshots[..=to_index].to_vec(),
            None => vec![to.to_owned()],
            Some(from) => {
                let from_index = source_snapshots
                    .iter()
                    .position(|name| name == from)
                    .ok_or_else(|| format!("incremental source {source}@{from} does not exist"))?;
                if replicate {
                    source_snapshots[from_index + 1..=to_index].to_vec()
                } else {
                    vec![to.to_owned()]
                }
            }
        };

        let existing = self.datasets.get(destination).cloned();
        let mut target = match (from, existing) {
            (None, Some(entry)) if !entry.snapshots.is_empty() && !force => {
                return Err(format!(
                    "cannot receive new filesystem stream: destination '{destination}' exists"
                ));
            }
            (None, Some(entry)) => FakeDataset {
                snapshots: Vec::new(),
                ..entry
            },
            (None, None) => FakeDataset::default(),
            (Some(_), None) => {
                return Err(format!(
                    "cannot receive incremental stream: destination '{destination}' does not exist"
                ));
            }
            (Some(from), Some(mut entry)) => {
                let Some(base) = entry.snapshots.iter().position(|name| name == from) else {
                    return Err(format!(
                        "cannot receive incremental stream: most recent snapshot of {destination} does not match incremental source"
                    ));
                };
                if base + 1 != entry.snapshots.len() {
                    if !force {
                        return Err(format!(
                            "cannot receive incremental stream: destination {destination} has been modified"
                        ));
                    }
                    entry.snapshots.truncate(base + 1);
                }
                if replicate && force {
                    entry.snapshots.retain(|name| source_snapshots.contains(name));
                }
                entry
            }
        };
        target.snapshots.extend(received);
        target.resume_token = None;
        self.datasets.insert(destination.clone(), target);

        if replicate && descend {
            for (child, relative) in self.descendants(source) {
                if relative.is_empty() {
                    continue;
                }
                let Ok(child_destination) = destination.join(&relative) else {
                    continue;
                };
                let has_snapshot = self
                    .datasets
                    .get(&child)
                    .is_some_and(|entry| entry.snapshots.iter().any(|name| name == to));
                if has_snapshot {
                    let child_from = from.filter(|from| {
                        self.datasets
                            .get(&child_destination)
                            .is_some_and(|entry| entry.snapshots.iter().any(|name| name == from))
                    });
                    self.receive(&child, &child_destination, child_from, to, true, true, false)?;
                }
            }
        }
        Ok(())
    }
}

fn default_pool_properties() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("feature@large_blocks".to_owned(), "active".to_owned()),
        ("feature@embedded_data".to_owned(), "active".to_owned()),
    ])
}

impl Repository for FakeZfs {
    fn list_snapshots(&mut self, dataset: &Dataset) -> Result<Vec<String>, RepositoryError> {
        Ok(self.entry(dataset)?.snapshots.iter().rev().cloned().collect())
    }

    fn list_datasets(&mut self, root: &Dataset) -> Result<Vec<Dataset>, RepositoryError> {
        self.entry(root)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .map(|(dataset, _)| dataset)
            .collect())
    }

    fn get_property(
        &mut self,
        dataset: &Dataset,
        name: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let entry = self.entry(dataset)?;
        Ok(match name {
            "encryption" => entry.encryption.clone(),
            _ => entry.properties.get(name).cloned(),
        })
    }

    fn local_properties(
        &mut self,
        dataset: &Dataset,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        Ok(self.entry(dataset)?.properties.clone())
    }

    fn pool_properties(
        &mut self,
        host: &str,
        pool: &str,
    ) -> Result<BTreeMap<String, String>, RepositoryError> {
        Ok(self
            .pools
            .get(&(host.to_owned(), pool.to_owned()))
            .cloned()
            .unwrap_or_else(default_pool_properties))
    }

    fn probe(&mut self, host: &str, capability: Capability) -> Result<bool, RepositoryError> {
        self.probes += 1;
        Ok(!self.unsupported.contains(&(host.to_owned(), capability)))
    }

    fn resume_token(&mut self, dataset: &Dataset) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .datasets
            .get(dataset)
            .and_then(|entry| entry.resume_token.clone()))
    }

    fn transfer(&mut self, request: &TransferRequest) -> Result<StepOutcome, RepositoryError> {
        self.transfers.push(request.clone());
        let (source, from, to) = match &request.stream {
            TransferStream::Snapshot { from, to } => {
                (request.source.clone(), from.clone(), to.clone())
            }
            TransferStream::Resume { token } => {
                if let Some(diagnostic) = self.resume_fault.take() {
                    return Ok(StepOutcome::failure(diagnostic));
                }
                let Some(pending) = self.pending.get(token).cloned() else {
                    return Ok(StepOutcome::failure("resume token is corrupt"));
                };
                (pending.source, pending.from, pending.to)
            }
        };
        self.events.push(format!(
            "send {source}@{to} -> {}{}",
            request.destination,
            if request.dry_run { " (dry run)" } else { "" }
        ));
        if request.dry_run {
            return Ok(StepOutcome::success(""));
        }

        match self.transfer_faults.get(&to).cloned() {
            Some(Fault::Fail { diagnostic, once }) => {
                if once {
                    self.transfer_faults.remove(&to);
                }
                return Ok(StepOutcome::failure(diagnostic));
            }
            Some(Fault::Interrupt { token }) => {
                self.transfer_faults.remove(&to);
                if request.receive.resumable {
                    self.datasets
                        .entry(request.destination.clone())
                        .or_default()
                        .resume_token = Some(token.clone());
                    self.pending.insert(
                        token,
                        PendingReceive {
                            source,
                            from,
                            to,
                        },
                    );
                }
                return Ok(StepOutcome::failure("broken pipe"));
            }
            Some(Fault::Benign { diagnostic }) => {
                self.transfer_faults.remove(&to);
                let received = self.receive(
                    &source,
                    &request.destination,
                    from.as_deref(),
                    &to,
                    request.send.replicate,
                    request.receive.force,
                    true,
                );
                return Ok(match received {
                    Ok(()) => StepOutcome {
                        succeeded: false,
                        benign_failure: true,
                        diagnostic,
                    },
                    Err(diagnostic) => StepOutcome::failure(diagnostic),
                });
            }
            None => {}
        }

        if let TransferStream::Resume { token } = &request.stream {
            self.pending.remove(token);
        }
        Ok(
            match self.receive(
                &source,
                &request.destination,
                from.as_deref(),
                &to,
                request.send.replicate,
                request.receive.force,
                true,
            ) {
                Ok(()) => StepOutcome::success(""),
                Err(diagnostic) => StepOutcome::failure(diagnostic),
            },
        )
    }

    fn destroy_dataset(
        &mut self,
        dataset: &Dataset,
        recursive: bool,
        dry_run: bool,
    ) -> Result<(), RepositoryError> {
        self.entry(dataset)?;
        self.events.push(format!(
            "destroy{} {dataset}{}",
            if recursive { " -r" } else { "" },
            if dry_run { " (dry run)" } else { "" }
        ));
        if let Some(diagnostic) = self.destroy_fault.take() {
            return Err(RepositoryError::CommandFailed {
                command: format!("zfs destroy {dataset}"),
                diagnostic,
            });
        }
        if !dry_run {
            let doomed: Vec<Dataset> = self
                .descendants(dataset)
                .into_iter()
                .filter(|(_, relative)| recursive || relative.is_empty())
                .map(|(dataset, _)| dataset)
                .collect();
            for dataset in doomed {
                self.datasets.remove(&dataset);
            }
        }
        Ok(())
    }

    fn destroy_snapshots(
        &mut self,
        dataset: &Dataset,
        names: &[String],
        dry_run: bool,
    ) -> Result<(), RepositoryError> {
        self.events.push(format!(
            "destroy {dataset}@{}{}",
            names.join(","),
            if dry_run { " (dry run)" } else { "" }
        ));
        if let Some(diagnostic) = self.destroy_fault.take() {
            return Err(RepositoryError::CommandFailed {
                command: format!("zfs destroy {dataset}@{}", names.join(",")),
                diagnostic,
            });
        }
        if !dry_run && let Some(entry) = self.datasets.get_mut(dataset) {
            entry.snapshots.retain(|name| !names.contains(name));
        }
        Ok(())
    }

    fn abort_pending_receive(&mut self, dataset: &Dataset) -> Result<(), RepositoryError> {
        self.events.push(format!("abort {dataset}"));
        let token = self
            .datasets
            .get_mut(dataset)
            .and_then(|entry| entry.resume_token.take());
        match token {
            Some(token) => {
                self.pending.remove(&token);
                if self
                    .datasets
                    .get(dataset)
                    .is_some_and(|entry| entry.snapshots.is_empty())
                {
                    self.datasets.remove(dataset);
                }
                Ok(())
            }
            None => Err(RepositoryError::CommandFailed {
                command: format!("zfs receive -A {dataset}"),
                diagnostic: format!("'{dataset}' does not have any resumable receive state to abort"),
            }),
        }
    }
}

/// A [`CommandRunner`] that answers from a script and records every command.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    responses: HashMap<String, CommandOutput>,
    pipe_responses: HashMap<String, PipelineOutput>,
    missing_program: Option<String>,
    /// Every invocation rendered as `[host] command`, pipelines as `a | b`.
    pub(crate) calls: Vec<String>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answers `command` (rendered like [`Invocation`]'s `Display`).
    pub(crate) fn respond(mut self, command: &str, output: CommandOutput) -> Self {
        self.responses.insert(command.to_owned(), output);
        self
    }

    /// Answers the pipeline `sender | receiver`.
    pub(crate) fn respond_pipe(mut self, pipeline: &str, output: PipelineOutput) -> Self {
        self.pipe_responses.insert(pipeline.to_owned(), output);
        self
    }

    /// Makes every spawn of `program` fail as if it were not installed.
    pub(crate) fn missing(mut self, program: &str) -> Self {
        self.missing_program = Some(program.to_owned());
        self
    }

    fn check_spawn(&self, invocation: &Invocation) -> Result<(), CommandError> {
        let program = invocation.spec().program();
        if self.missing_program.as_deref() == Some(program) {
            return Err(CommandError::Spawn {
                program: program.to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(())
    }
}

pub(crate) fn pipeline_output(
    sender_code: i32,
    sender_transcript: &str,
    receiver_code: i32,
    receiver_transcript: &str,
) -> PipelineOutput {
    PipelineOutput {
        sender: ProcessStatus::exited(sender_code),
        receiver: ProcessStatus::exited(receiver_code),
        sender_transcript: sender_transcript.to_owned(),
        receiver_transcript: receiver_transcript.to_owned(),
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        invocation.spec().validate()?;
        self.check_spawn(invocation)?;
        let rendered = invocation.to_string();
        self.calls.push(rendered.clone());
        Ok(self
            .responses
            .get(&rendered)
            .cloned()
            .unwrap_or_else(|| CommandOutput::success("")))
    }

    fn pipe(
        &mut self,
        sender: &Invocation,
        receiver: &Invocation,
        relay: &mut dyn FnMut(StreamSide, &str),
    ) -> Result<PipelineOutput, CommandError> {
        self.check_spawn(sender)?;
        self.check_spawn(receiver)?;
        let rendered = format!("{sender} | {receiver}");
        self.calls.push(rendered.clone());
        let output = self
            .pipe_responses
            .get(&rendered)
            .cloned()
            .unwrap_or_else(|| pipeline_output(0, "", 0, ""));
        for line in output.sender_transcript.lines() {
            relay(StreamSide::Sender, line);
        }
        for line in output.receiver_transcript.lines() {
            relay(StreamSide::Receiver, line);
        }
        Ok(output)
    }
}
