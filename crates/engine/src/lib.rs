#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` holds the decision logic of zrsync. Everything here is a pure
//! function of its inputs: listings come in as [`SnapshotSet`] values, the
//! user's intent as a [`ReplicationPolicy`], and the result is a [`Plan`]
//! or a typed refusal. Executing a plan, probing endpoints and talking to
//! the snapshot engine are the `client` crate's job.
//!
//! # Design
//!
//! - [`plan()`] reconciles a source and destination snapshot set around their
//!   most recent common snapshot and emits ordered [`PlanStep`]s.
//! - [`EncryptionRules`] translate an [`EncryptionContext`] into option
//!   adjustments, refusing encrypted-to-plaintext replication outright.
//! - [`resume`] and [`retry`] decide what happens around interrupted receives
//!   and failed steps.
//! - [`signatures`] and [`capability`] classify the text the snapshot engine
//!   prints, so probe and failure handling is table driven.
//!
//! # Examples
//!
//! ```
//! use engine::{
//!     Dataset, EncryptionContext, PlanConstraints, PlanStep, ReplicationPolicy, SnapshotSet,
//!     plan,
//! };
//!
//! let source = SnapshotSet::new(Dataset::local("tank/data").unwrap(), ["s3", "s2", "s1"]);
//! let destination = SnapshotSet::new(Dataset::local("backup/data").unwrap(), ["s1"]);
//!
//! let plan = plan(
//!     &source,
//!     &destination,
//!     None,
//!     &ReplicationPolicy::default(),
//!     &EncryptionContext::default(),
//!     PlanConstraints::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(plan.len(), 2);
//! assert!(matches!(&plan.steps()[0], PlanStep::Transfer(t) if t.to == "s2"));
//! ```

pub mod capability;
mod dataset;
mod encryption;
mod error;
mod plan;
mod policy;
pub mod resume;
pub mod retry;
pub mod signatures;
mod snapshot;

pub use dataset::{Dataset, DatasetError};
pub use encryption::{EncryptionContext, EncryptionRules, is_encrypted};
pub use error::PlanError;
pub use plan::{
    DESTROY_BATCH_LIMIT, DeleteTiming, Plan, PlanConstraints, PlanStep, TransferStep,
    destroy_batches, plan,
};
pub use policy::{ReplicationPolicy, ReplicationPolicyBuilder};
pub use snapshot::SnapshotSet;
