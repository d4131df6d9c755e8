//! crates/logging/src/sink.rs
//! Shared line-oriented writer for diagnostics.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Prefix placed in front of every diagnostic line.
pub const DIAGNOSTIC_PREFIX: &str = "zrsync: ";

/// Cloneable handle to a writer that receives one diagnostic per line.
///
/// Diagnostics may be produced from the stream reader threads as well as the
/// coordinating thread, so the writer sits behind a mutex and every line is
/// written and flushed while the lock is held. Lines from different threads
/// never interleave mid-line.
#[derive(Debug)]
pub struct DiagnosticSink<W> {
    inner: Arc<Mutex<W>>,
}

impl<W: Write> DiagnosticSink<W> {
    /// Wraps `writer` in a sink.
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Writes `message` prefixed with [`DIAGNOSTIC_PREFIX`] and a newline.
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        self.with_writer(|writer| {
            writer.write_all(DIAGNOSTIC_PREFIX.as_bytes())?;
            writer.write_all(message.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()
        })
    }

    /// Runs `f` with exclusive access to the underlying writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<W> Clone for DiagnosticSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DiagnosticSink<io::Stderr> {
    /// Sink writing to the process's standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}
