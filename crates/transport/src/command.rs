//! Structured command descriptors.

use std::fmt;
use std::io;

use thiserror::Error;

/// A program and its arguments, kept as discrete words.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a descriptor for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument from `args`.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends one argument in place.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Rejects descriptors that cannot be executed faithfully.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::EmptyProgram`] when no program is named and
    /// [`CommandError::NulByte`] when any word contains a NUL byte.
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.program.is_empty() {
            return Err(CommandError::EmptyProgram);
        }
        if let Some(word) = self.words().find(|word| word.contains('\0')) {
            return Err(CommandError::NulByte(word.replace('\0', "\\0")));
        }
        Ok(())
    }

    fn words(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Renders the command as a single shell-safe line.
    #[must_use]
    pub fn render(&self) -> String {
        self.quoted_words().collect::<Vec<_>>().join(" ")
    }

    /// Yields every word quoted for a POSIX shell.
    pub fn quoted_words(&self) -> impl Iterator<Item = String> + '_ {
        self.words().map(shell_quote)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Where a command runs together with what it runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    host: String,
    spec: CommandSpec,
}

impl Invocation {
    /// Creates an invocation. An empty `host` runs the command locally.
    #[must_use]
    pub fn new(host: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            host: host.into(),
            spec,
        }
    }

    /// Returns the `user@host` label, empty for local execution.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the command descriptor.
    #[must_use]
    pub const fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Returns `true` when the command runs on the local machine.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            write!(f, "{}", self.spec)
        } else {
            write!(f, "[{}] {}", self.host, self.spec)
        }
    }
}

/// Errors raised while preparing or spawning commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The descriptor named no program.
    #[error("command has an empty program name")]
    EmptyProgram,
    /// A word contained an embedded NUL byte.
    #[error("command argument contains a NUL byte: {0}")]
    NulByte(String),
    /// The remote shell specification could not be parsed.
    #[error(transparent)]
    RemoteShell(#[from] crate::ssh::RemoteShellParseError),
    /// The process could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Waiting on or reading from a process failed.
    #[error("I/O error while running '{program}': {source}")]
    Io {
        /// Program being run.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Returns `true` when the program itself could not be found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Quotes `word` for a POSIX shell, leaving plain words untouched.
#[must_use]
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.' | ':' | '=' | '@' | ',' | '+')
        })
    {
        return word.to_owned();
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('\'');
    for ch in word.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}
