#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` routes zrsync diagnostics through [`tracing`]. Code across the
//! workspace emits ordinary `tracing` events with a `zrsync::<category>`
//! target; the [`ReplicationLayer`] installed by [`init_tracing`] decides,
//! from the `-v` count, which of those events reach the diagnostic stream.
//!
//! # Design
//!
//! - [`InfoFlag`] / [`DebugFlag`] name the diagnostic categories and
//!   [`VerbosityConfig`] stores a level per flag, mirroring how rsync's
//!   `--info`/`--debug` flags work.
//! - [`ReplicationLayer`] maps event targets to flags. Warnings and errors are
//!   always rendered; info, debug and trace events need level 1, 2 and 3 on
//!   their flag respectively.
//! - [`DiagnosticSink`] serializes lines from several threads into one writer,
//!   so the send/receive stream readers can relay output in real time.
//!
//! # Examples
//!
//! ```
//! use logging::{DiagnosticSink, InfoFlag, VerbosityConfig};
//!
//! let config = VerbosityConfig::from_verbose_level(1);
//! assert!(config.info_gte(InfoFlag::Send, 1));
//!
//! let sink = DiagnosticSink::new(Vec::new());
//! sink.write_line("hello").unwrap();
//! assert!(sink.with_writer(|buffer| buffer.ends_with(b"hello\n")));
//! ```

mod config;
mod levels;
mod sink;
mod tracing_bridge;

pub use config::VerbosityConfig;
pub use levels::{DebugFlag, DebugLevels, InfoFlag, InfoLevels};
pub use sink::{DIAGNOSTIC_PREFIX, DiagnosticSink};
pub use tracing_bridge::{ReplicationLayer, init_tracing};
