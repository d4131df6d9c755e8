//! Execution seam between the replication client and real processes.

use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::command::{CommandError, Invocation};
use crate::operand::RemoteHost;
use crate::pipeline::{PipelineOutput, ProcessStatus, StreamSide, run_pipeline};
use crate::ssh::{SshCommand, parse_remote_shell};

/// Captured result of a finished command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit status of the process.
    pub status: ProcessStatus,
    /// Everything written to standard output.
    pub stdout: String,
    /// Everything written to standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited with status zero.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: ProcessStatus::exited(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a command that exited with a non-zero `code`.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: ProcessStatus::exited(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` when the process exited successfully.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.status.success
    }
}

/// Runs commands on behalf of the replication client.
pub trait CommandRunner {
    /// Runs `invocation` to completion and captures its output.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command cannot be started. A process
    /// that starts and exits non-zero is reported through
    /// [`CommandOutput::status`], not as an error.
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;

    /// Pipes `sender`'s standard output into `receiver`'s standard input.
    ///
    /// Diagnostic lines from both sides are passed to `relay` as they arrive.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when either process cannot be started.
    fn pipe(
        &mut self,
        sender: &Invocation,
        receiver: &Invocation,
        relay: &mut dyn FnMut(StreamSide, &str),
    ) -> Result<PipelineOutput, CommandError>;
}

/// [`CommandRunner`] backed by real local processes and the remote shell.
#[derive(Clone, Debug, Default)]
pub struct ProcessRunner {
    remote_shell: Option<OsString>,
}

impl ProcessRunner {
    /// Runner using the default `ssh` remote shell.
    #[must_use]
    pub const fn new() -> Self {
        Self { remote_shell: None }
    }

    /// Runner using a custom remote shell specification.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::RemoteShell`] when `spec` cannot be split into
    /// words.
    pub fn with_remote_shell(spec: impl Into<OsString>) -> Result<Self, CommandError> {
        let spec = spec.into();
        parse_remote_shell(&spec)?;
        Ok(Self {
            remote_shell: Some(spec),
        })
    }

    /// Returns the configured remote shell specification, if any.
    #[must_use]
    pub fn remote_shell(&self) -> Option<&OsStr> {
        self.remote_shell.as_deref()
    }

    /// Translates an invocation into a process builder.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the descriptor is invalid or the remote
    /// shell specification cannot be parsed.
    pub fn command_for(&self, invocation: &Invocation) -> Result<Command, CommandError> {
        let spec = invocation.spec();
        spec.validate()?;

        let Some(remote) = RemoteHost::from_label(invocation.host()) else {
            let mut command = Command::new(spec.program());
            command.args(spec.arguments());
            return Ok(command);
        };

        let mut ssh = SshCommand::new(remote.host());
        if let Some(user) = remote.user() {
            ssh.set_user(user);
        }
        if let Some(shell) = &self.remote_shell {
            ssh.configure_remote_shell(shell)?;
        }
        ssh.set_remote_command(spec.quoted_words());
        Ok(ssh.to_command())
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        debug!(target: "zrsync::cmd", "running {invocation}");
        let program = invocation.spec().program().to_owned();
        let output = self
            .command_for(invocation)?
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn { program, source })?;

        Ok(CommandOutput {
            status: ProcessStatus::from(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn pipe(
        &mut self,
        sender: &Invocation,
        receiver: &Invocation,
        relay: &mut dyn FnMut(StreamSide, &str),
    ) -> Result<PipelineOutput, CommandError> {
        debug!(target: "zrsync::cmd", "running {sender} | {receiver}");
        let sender_command = self.command_for(sender)?;
        let receiver_command = self.command_for(receiver)?;
        run_pipeline(sender_command, receiver_command, relay)
    }
}
