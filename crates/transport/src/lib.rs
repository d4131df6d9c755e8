#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `transport` is the process plumbing underneath zrsync. It knows nothing
//! about snapshots: it parses `[user@]host:dataset` endpoints, turns
//! structured command descriptors into local or remote-shell invocations,
//! and wires a sending process into a receiving process while relaying the
//! diagnostic output of both.
//!
//! # Design
//!
//! - [`Endpoint`] is produced by [`parse_endpoint`]. Operands without a host
//!   prefix are local.
//! - [`CommandSpec`] holds a program and its arguments as discrete strings.
//!   Nothing is shell-interpreted locally; for remote execution every argument
//!   is quoted with [`shell_quote`] before being handed to the remote shell.
//! - [`CommandRunner`] is the seam the replication client drives. The
//!   production [`ProcessRunner`] spawns real processes; tests substitute
//!   in-memory fakes.
//! - [`run_pipeline`] connects the sender's stdout to the receiver's stdin and
//!   drains both stderr streams concurrently through a channel so that no
//!   process can block on a full pipe.
//!
//! # Examples
//!
//! ```
//! use transport::{CommandSpec, parse_endpoint};
//!
//! let endpoint = parse_endpoint("backup@nas:tank/data").unwrap();
//! assert_eq!(endpoint.host_label(), "backup@nas");
//! assert_eq!(endpoint.path(), "tank/data");
//!
//! let spec = CommandSpec::new("zfs").arg("list").arg("tank/my data");
//! assert_eq!(spec.render(), "zfs list 'tank/my data'");
//! ```

mod command;
mod operand;
mod pipeline;
mod runner;
pub mod ssh;

pub use command::{CommandError, CommandSpec, Invocation, shell_quote};
pub use operand::{Endpoint, EndpointParseError, RemoteHost, parse_endpoint};
pub use pipeline::{PipelineOutput, ProcessStatus, StreamSide, run_pipeline};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
