#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` decides which snapshot names take part in a replication run. A
//! [`SnapshotFilter`] wraps a regular expression supplied through
//! `--snapshot-filter`; snapshots whose names match are eligible to be sent,
//! and (unless `--delete-excluded` is active) only matching destination
//! snapshots are candidates for deletion.
//!
//! # Design
//!
//! - [`SnapshotFilter`] compiles the pattern once and evaluates it with search
//!   semantics: the expression may match anywhere in the name. Callers anchor
//!   the pattern with `^`/`$` when they need whole-name matches.
//! - A missing filter is modelled as `Option<&SnapshotFilter>`; [`allows`]
//!   treats `None` as "match everything" so callers do not special-case it.
//!
//! # Invariants
//!
//! - Evaluation is pure and deterministic; the same name always produces the
//!   same decision for a given filter.
//! - [`SnapshotFilter::partition`] preserves the input order in both halves.
//!
//! # Errors
//!
//! [`SnapshotFilter::new`] reports [`FilterError`] when the pattern is not a
//! valid regular expression. The error keeps the offending pattern and the
//! underlying [`regex::Error`].
//!
//! # Examples
//!
//! ```
//! use filters::{SnapshotFilter, allows};
//!
//! let filter = SnapshotFilter::new("^daily-").expect("pattern compiles");
//!
//! assert!(filter.matches("daily-2024-05-01"));
//! assert!(!filter.matches("hourly-2024-05-01T10"));
//! assert!(allows(None, "anything"));
//! assert!(!allows(Some(&filter), "manual"));
//! ```

mod error;
mod filter;

pub use error::FilterError;
pub use filter::{SnapshotFilter, allows};
