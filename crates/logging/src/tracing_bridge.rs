//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and zrsync's verbosity system.
//!
//! [`ReplicationLayer`] is a tracing-subscriber layer that maps event targets
//! (`zrsync::send`, `zrsync::cmd`, ...) to info and debug flags, consults the
//! [`VerbosityConfig`] and renders accepted events into a
//! [`DiagnosticSink`]. Warnings and errors bypass the flag check.
//!
//! ```rust,ignore
//! use logging::{DiagnosticSink, VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2), DiagnosticSink::stderr());
//! tracing::info!(target: "zrsync::send", "sending tank/data@daily-1");
//! ```

use std::fmt::Write as _;
use std::io::Write;

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::config::VerbosityConfig;
use super::levels::{DebugFlag, InfoFlag};
use super::sink::DiagnosticSink;

/// A tracing layer that filters events through the verbosity flags.
pub struct ReplicationLayer<W> {
    config: VerbosityConfig,
    sink: DiagnosticSink<W>,
}

impl<W> ReplicationLayer<W> {
    /// Create a layer writing accepted events into `sink`.
    #[must_use]
    pub const fn new(config: VerbosityConfig, sink: DiagnosticSink<W>) -> Self {
        Self { config, sink }
    }

    /// Map a tracing target to an info flag.
    fn target_to_info_flag(target: &str) -> Option<InfoFlag> {
        match target {
            t if t.ends_with("::send") || t == "send" => Some(InfoFlag::Send),
            t if t.ends_with("::del") || t.ends_with("::delete") || t == "del" => {
                Some(InfoFlag::Del)
            }
            t if t.ends_with("::resume") || t == "resume" => Some(InfoFlag::Resume),
            t if t.ends_with("::misc") || t == "misc" => Some(InfoFlag::Misc),
            t if t.ends_with("::stats") || t == "stats" => Some(InfoFlag::Stats),
            t if t.ends_with("::stream") || t == "stream" => Some(InfoFlag::Stream),
            _ => None,
        }
    }

    /// Map a tracing target to a debug flag.
    fn target_to_debug_flag(target: &str) -> Option<DebugFlag> {
        match target {
            t if t.ends_with("::cmd") || t == "cmd" => Some(DebugFlag::Cmd),
            t if t.ends_with("::probe") || t == "probe" => Some(DebugFlag::Probe),
            t if t.ends_with("::plan") || t == "plan" => Some(DebugFlag::Plan),
            t if t.ends_with("::retry") || t == "retry" => Some(DebugFlag::Retry),
            _ => None,
        }
    }

    /// Map a tracing level to a verbosity level; `None` means always shown.
    fn level_to_verbosity_level(level: &Level) -> Option<u8> {
        if *level == Level::INFO {
            Some(1)
        } else if *level == Level::DEBUG {
            Some(2)
        } else if *level == Level::TRACE {
            Some(3)
        } else {
            None
        }
    }

    fn accepts(&self, target: &str, level: &Level) -> bool {
        let Some(verbosity) = Self::level_to_verbosity_level(level) else {
            return true;
        };

        if let Some(flag) = Self::target_to_debug_flag(target) {
            return self.config.debug_gte(flag, verbosity);
        }

        Self::target_to_info_flag(target).is_some_and(|flag| self.config.info_gte(flag, verbosity))
    }
}

impl<S, W> Layer<S> for ReplicationLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.accepts(metadata.target(), metadata.level()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let Some(message) = visitor.finish() else {
            return;
        };

        let level = *metadata.level();
        let line = if level == Level::ERROR {
            format!("error: {message}")
        } else if level == Level::WARN {
            format!("warning: {message}")
        } else {
            message
        };
        // A failing diagnostic writer must not abort replication.
        let _ = self.sink.write_line(&line);
    }
}

/// Visitor to extract the message and structured fields from an event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> Option<String> {
        match (self.message, self.fields.is_empty()) {
            (Some(message), true) => Some(message),
            (Some(message), false) => Some(format!("{message}{}", self.fields)),
            (None, false) => Some(self.fields.trim_start().to_owned()),
            (None, true) => None,
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Install the verbosity layer as the global tracing subscriber.
///
/// Returns `false` when a global subscriber was already installed (for
/// example when the CLI entry point runs several times in one test process);
/// the existing subscriber is kept.
pub fn init_tracing<W>(config: VerbosityConfig, sink: DiagnosticSink<W>) -> bool
where
    W: Write + Send + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(ReplicationLayer::new(config, sink))
        .try_init()
        .is_ok()
}
