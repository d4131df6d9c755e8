//! Remote shell command construction.
//!
//! [`SshCommand`] assembles the argument vector for the remote shell
//! (`ssh` by default, or whatever `-e/--rsh` names). The remote command is
//! passed as trailing arguments which the remote side joins with spaces and
//! hands to its login shell, so callers quote each word before pushing it.

mod parse;

use std::ffi::{OsStr, OsString};
use std::process::Command;

pub use parse::{RemoteShellParseError, parse_remote_shell};

/// Builder for a remote shell invocation.
#[derive(Clone, Debug)]
pub struct SshCommand {
    program: OsString,
    user: Option<OsString>,
    host: OsString,
    port: Option<u16>,
    batch_mode: bool,
    options: Vec<OsString>,
    remote_command: Vec<OsString>,
}

impl SshCommand {
    /// Creates a builder targeting `host` with the default `ssh` program.
    #[must_use]
    pub fn new(host: impl Into<OsString>) -> Self {
        Self {
            program: OsString::from("ssh"),
            user: None,
            host: host.into(),
            port: None,
            batch_mode: true,
            options: Vec::new(),
            remote_command: Vec::new(),
        }
    }

    /// Sets the login name.
    pub fn set_user(&mut self, user: impl Into<OsString>) -> &mut Self {
        self.user = Some(user.into());
        self
    }

    /// Sets an explicit port passed as `-p`.
    pub const fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Replaces the remote shell program.
    pub fn set_program(&mut self, program: impl Into<OsString>) -> &mut Self {
        self.program = program.into();
        self
    }

    /// Enables or disables `-oBatchMode=yes`.
    ///
    /// Batch mode keeps ssh from prompting for passwords, which would hang an
    /// unattended replication run.
    pub const fn set_batch_mode(&mut self, enabled: bool) -> &mut Self {
        self.batch_mode = enabled;
        self
    }

    /// Appends an option placed before the target.
    pub fn push_option(&mut self, option: impl Into<OsString>) -> &mut Self {
        self.options.push(option.into());
        self
    }

    /// Appends one word of the remote command.
    pub fn push_remote_arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.remote_command.push(arg.into());
        self
    }

    /// Replaces the remote command.
    pub fn set_remote_command<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.remote_command = args.into_iter().map(Into::into).collect();
        self
    }

    /// Applies a user supplied remote shell specification such as
    /// `ssh -p 2222 -i key`.
    ///
    /// The first word becomes the program, the rest become options. Batch mode
    /// is only added for the stock `ssh` program.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteShellParseError`] when the specification is empty or
    /// contains an unterminated quote.
    pub fn configure_remote_shell(&mut self, spec: &OsStr) -> Result<&mut Self, RemoteShellParseError> {
        let mut words = parse_remote_shell(spec)?.into_iter();
        let program = words.next().ok_or(RemoteShellParseError::Empty)?;
        self.batch_mode = is_stock_ssh(&program);
        self.program = program;
        self.options.extend(words);
        Ok(self)
    }

    fn target(&self) -> Option<OsString> {
        if self.host.is_empty() && self.user.is_none() {
            return None;
        }
        let mut target = OsString::new();
        if let Some(user) = &self.user {
            target.push(user);
            target.push("@");
        }
        target.push(&self.host);
        Some(target)
    }

    /// Returns the program and argument vector this builder describes.
    #[must_use]
    pub fn command_parts(&self) -> (OsString, Vec<OsString>) {
        let mut args = Vec::with_capacity(self.options.len() + self.remote_command.len() + 4);
        if self.batch_mode {
            args.push(OsString::from("-oBatchMode=yes"));
        }
        if let Some(port) = self.port {
            args.push(OsString::from("-p"));
            args.push(OsString::from(port.to_string()));
        }
        args.extend(self.options.iter().cloned());
        if let Some(target) = self.target() {
            args.push(target);
        }
        args.extend(self.remote_command.iter().cloned());
        (self.program.clone(), args)
    }

    /// Builds a [`Command`] ready to be configured with stdio and spawned.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let (program, args) = self.command_parts();
        let mut command = Command::new(program);
        command.args(args);
        command
    }
}

fn is_stock_ssh(program: &OsStr) -> bool {
    std::path::Path::new(program)
        .file_name()
        .is_some_and(|name| name == "ssh")
}
