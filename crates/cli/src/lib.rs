#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the command-line front-end of `zrsync`. It recognises the
//! replication switches (`--delete`, `--delete-before`, `--delete-excluded`,
//! `--dry-run`, `--recursive`, `--no-mount`, `--snapshot-filter`,
//! `--property`, `--exclude-property`, `--rsh` and `--verbose`) together with
//! the `SOURCE` and `DEST` operands, and delegates the replication to
//! [`client::run_client`].
//!
//! # Design
//!
//! The crate exposes [`run`] as the primary entry point. The function accepts
//! an iterator of arguments together with handles for standard output and
//! error. A [`clap`](https://docs.rs/clap/) command definition parses the
//! arguments; the parsed switches are turned into a [`client::ClientConfig`]
//! and diagnostics are routed through the [`logging`] tracing layer.
//!
//! # Invariants
//!
//! - `run` never panics; failures surface as non-zero exit codes.
//! - Every failure writes exactly one `zrsync error: <message> (code N)` line
//!   to the error stream, where `N` is the returned exit code.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["zrsync", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(!stdout.is_empty());
//! assert!(stderr.is_empty());
//! ```
//!
//! # See also
//!
//! - `src/bin/zrsync.rs` for the binary that wires [`run`] into `main`.

mod frontend;

pub use frontend::run;
