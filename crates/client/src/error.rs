//! Client error type.

use engine::{DatasetError, PlanError};
use filters::FilterError;
use thiserror::Error;
use transport::{CommandError, EndpointParseError};

use crate::exit_code::{ExitCode, HasExitCode};
use crate::repository::RepositoryError;

/// Errors that end a replication run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A source or destination operand was not given.
    #[error("missing {0} operand")]
    MissingOperand(&'static str),
    /// An operand was not usable as an endpoint at all.
    #[error("invalid operand '{operand}': {reason}")]
    InvalidOperand {
        /// Operand as given, lossily decoded.
        operand: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// An operand could not be parsed.
    #[error("invalid endpoint '{operand}': {source}")]
    InvalidEndpoint {
        /// Operand as given.
        operand: String,
        /// Parse failure.
        #[source]
        source: EndpointParseError,
    },
    /// An operand named an invalid dataset.
    #[error("invalid {role} dataset: {source}")]
    InvalidDataset {
        /// `source` or `destination`.
        role: &'static str,
        /// Validation failure.
        #[source]
        source: DatasetError,
    },
    /// Source and destination are the same dataset.
    #[error("source and destination are the same dataset: {0}")]
    SameDataset(String),
    /// A recursive run would receive into its own source tree.
    #[error("destination {destination} is inside the recursively replicated source {source_dataset}")]
    NestedDestination {
        /// Source dataset.
        source_dataset: String,
        /// Destination dataset.
        destination: String,
    },
    /// A `--property` value was not `NAME=VALUE`.
    #[error("invalid property override '{0}': expected NAME=VALUE")]
    InvalidPropertyOverride(String),
    /// A `--exclude-property` value was malformed.
    #[error("invalid property exclusion '{0}': expected a property name")]
    InvalidPropertyExclude(String),
    /// The snapshot filter did not compile.
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// The remote shell specification could not be used.
    #[error("invalid remote shell: {0}")]
    RemoteShell(#[source] CommandError),
    /// The source dataset does not exist.
    #[error("source dataset {0} does not exist")]
    SourceMissing(String),
    /// The planner refused a dataset pair.
    #[error("{pair}: {source}")]
    Plan {
        /// `source -> destination` label.
        pair: String,
        /// Refusal reason.
        #[source]
        source: PlanError,
    },
    /// A step failed before the attempt made any progress.
    #[error("{pair}: {step} failed: {diagnostic}")]
    StepFailed {
        /// `source -> destination` label.
        pair: String,
        /// Description of the step.
        step: String,
        /// What the commands printed.
        diagnostic: String,
    },
    /// Continuing an interrupted receive failed for an unexpected reason.
    #[error("{dataset}: resuming interrupted receive failed: {diagnostic}")]
    ResumeFailed {
        /// Destination dataset.
        dataset: String,
        /// What the commands printed.
        diagnostic: String,
    },
    /// The snapshot engine could not be queried.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl HasExitCode for ClientError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::MissingOperand(_)
            | Self::InvalidOperand { .. }
            | Self::InvalidEndpoint { .. }
            | Self::InvalidDataset { .. }
            | Self::SameDataset(_)
            | Self::NestedDestination { .. }
            | Self::InvalidPropertyOverride(_)
            | Self::InvalidPropertyExclude(_)
            | Self::Filter(_)
            | Self::RemoteShell(_) => ExitCode::Syntax,
            Self::SourceMissing(_) => ExitCode::FileSelect,
            Self::Plan {
                source: PlanError::EncryptionDowngrade { .. },
                ..
            } => ExitCode::Unsupported,
            Self::Plan { .. } => ExitCode::Refused,
            Self::StepFailed { .. } | Self::ResumeFailed { .. } => ExitCode::FileIo,
            Self::Repository(error) => error.exit_code(),
        }
    }
}

impl HasExitCode for RepositoryError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound { .. } => ExitCode::FileSelect,
            Self::CommandFailed { .. } | Self::Malformed { .. } => ExitCode::FileIo,
            Self::Command(error) if error.is_not_found() => ExitCode::CommandNotFound,
            Self::Command(_) => ExitCode::StartClient,
        }
    }
}
