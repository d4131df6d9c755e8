#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `client` runs a replication: it resolves the endpoints of a
//! [`ClientConfig`], negotiates transfer features, enumerates dataset pairs
//! and drives each pair through resume handling, planning and step execution
//! until it converges or fails.
//!
//! # Design
//!
//! - [`Repository`] is the seam to the snapshot engine. [`ZfsRepository`]
//!   implements it with `zfs`/`zpool` commands through a
//!   [`transport::CommandRunner`]; tests use an in-memory fake.
//! - [`FeatureNegotiator`] caches probe and pool-feature results per host.
//! - [`RetryCoordinator`] owns the per-pair loop: refresh state, resolve
//!   pending receives, plan with [`engine::plan`], execute, and replan after a
//!   failure that followed progress.
//! - Errors are [`ClientError`] values carrying an [`ExitCode`] through
//!   [`HasExitCode`].
//!
//! # Examples
//!
//! ```no_run
//! use client::{ClientConfig, run_client};
//! use engine::ReplicationPolicy;
//! use transport::parse_endpoint;
//!
//! let config = ClientConfig::builder()
//!     .source(parse_endpoint("tank/data").unwrap())
//!     .destination(parse_endpoint("backup@nas:vault/data").unwrap())
//!     .policy(ReplicationPolicy::builder().delete(true).build())
//!     .build();
//!
//! let summary = run_client(&config).unwrap();
//! println!("{summary}");
//! ```

mod catalog;
mod config;
mod coordinator;
mod encryption;
mod error;
pub mod exit_code;
mod executor;
mod negotiator;
mod options;
mod repository;
mod resume;
mod run;
mod summary;
mod walker;
mod zfs;

#[cfg(test)]
mod test_utils;

pub use catalog::snapshot_set;
pub use config::{ClientConfig, ClientConfigBuilder, PropertyOverride};
pub use coordinator::RetryCoordinator;
pub use encryption::resolve_encryption;
pub use error::ClientError;
pub use exit_code::{ExitCode, HasExitCode};
pub use executor::{StepExecutor, StepStatus};
pub use negotiator::FeatureNegotiator;
pub use options::OptionSet;
pub use repository::{
    ReceiveOptions, Repository, RepositoryError, SendOptions, StepOutcome, TransferRequest,
    TransferStream,
};
pub use resume::{ResumeOutcome, ResumeResolver};
pub use run::{run_client, run_client_with};
pub use summary::ReplicationSummary;
pub use walker::{DatasetPair, dataset_pairs};
pub use zfs::ZfsRepository;
