mod arguments;
mod command_builder;
mod execution;


use std::ffi::OsString;
use std::io::Write;

use client::{ExitCode, HasExitCode, run_client};
use logging::{DiagnosticSink, VerbosityConfig, init_tracing};
use tracing::debug;

use arguments::{ParsedArgs, parse_args};
use command_builder::clap_command;
use execution::build_config;

/// Name used in banners and diagnostics.
pub(crate) const PROGRAM_NAME: &str = "zrsync";

/// Runs the command-line front-end with the provided arguments.
///
/// The first argument is the program name. Help and version output go to
/// `stdout`; a failure writes a single diagnostic line to `stderr`. Progress
/// diagnostics requested with `-v` are routed through the global tracing
/// subscriber to the process's standard error.
///
/// Returns the process exit status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    match parse_args(args) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let rendered = error.to_string();
            let line = rendered.lines().next().unwrap_or_default();
            let message = line.strip_prefix("error: ").unwrap_or(line);
            report(stderr, message, ExitCode::Syntax)
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        return write_or_fail(stdout, stderr, &render_help());
    }
    if parsed.show_version {
        return write_or_fail(stdout, stderr, &render_version());
    }

    let installed = init_tracing(
        VerbosityConfig::from_verbose_level(parsed.verbosity),
        DiagnosticSink::stderr(),
    );
    if !installed {
        debug!(target: "zrsync::misc", "tracing subscriber already installed");
    }

    let result = build_config(parsed).and_then(|config| run_client(&config));
    match result {
        Ok(_) => ExitCode::Ok.as_i32(),
        Err(error) => report(stderr, &error.to_string(), error.exit_code()),
    }
}

fn render_help() -> String {
    format!("{}\n", clap_command(PROGRAM_NAME).render_help())
}

fn render_version() -> String {
    format!("{PROGRAM_NAME} {}\n", env!("CARGO_PKG_VERSION"))
}

fn write_or_fail<Out, Err>(stdout: &mut Out, stderr: &mut Err, text: &str) -> i32
where
    Out: Write,
    Err: Write,
{
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => ExitCode::Ok.as_i32(),
        Err(error) => report(
            stderr,
            &format!("failed to write output: {error}"),
            ExitCode::FileIo,
        ),
    }
}

fn report<Err: Write>(stderr: &mut Err, message: &str, code: ExitCode) -> i32 {
    let status = code.as_i32();
    // Nothing else can be done when the error stream itself is gone.
    let _ = writeln!(stderr, "{PROGRAM_NAME} error: {message} (code {status})");
    status
}
