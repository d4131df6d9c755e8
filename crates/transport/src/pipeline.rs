//! Sender to receiver process pipelines.
//!
//! The sender's standard output is handed directly to the receiver as its
//! standard input, so the snapshot stream never passes through this process.
//! Both standard error streams are drained by dedicated reader threads that
//! forward complete lines over a channel; the calling thread relays them in
//! arrival order and keeps a transcript per side for later classification.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use crossbeam_channel::{Sender, unbounded};

use crate::command::CommandError;

/// Which side of the pipeline produced a line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StreamSide {
    /// The snapshot sending process.
    Sender,
    /// The snapshot receiving process.
    Receiver,
}

impl StreamSide {
    /// Short label used when relaying output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sender => "send",
            Self::Receiver => "receive",
        }
    }
}

/// Exit status of one process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProcessStatus {
    /// `true` when the process exited with status zero.
    pub success: bool,
    /// Exit code, absent when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ProcessStatus {
    /// Status of a process that exited with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

impl From<ExitStatus> for ProcessStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Result of a finished pipeline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PipelineOutput {
    /// Exit status of the sender.
    pub sender: ProcessStatus,
    /// Exit status of the receiver.
    pub receiver: ProcessStatus,
    /// Diagnostic lines emitted by the sender.
    pub sender_transcript: String,
    /// Diagnostic lines emitted by the receiver.
    pub receiver_transcript: String,
}

impl PipelineOutput {
    /// Returns `true` when both processes exited successfully.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.sender.success && self.receiver.success
    }

    /// Both transcripts, sender first.
    #[must_use]
    pub fn combined_transcript(&self) -> String {
        let mut combined = self.sender_transcript.clone();
        combined.push_str(&self.receiver_transcript);
        combined
    }
}

/// Runs `sender | receiver`, relaying stderr lines of both through `relay`.
///
/// # Errors
///
/// Returns [`CommandError::Spawn`] when either process fails to start and
/// [`CommandError::Io`] when waiting for them fails. If the receiver cannot
/// be started the already running sender is killed and reaped.
pub fn run_pipeline(
    mut sender: Command,
    mut receiver: Command,
    relay: &mut dyn FnMut(StreamSide, &str),
) -> Result<PipelineOutput, CommandError> {
    let sender_program = program_name(&sender);
    let receiver_program = program_name(&receiver);

    let mut sender_child = sender
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: sender_program.clone(),
            source,
        })?;

    let stream = match sender_child.stdout.take() {
        Some(stream) => Stdio::from(stream),
        None => Stdio::null(),
    };

    let mut receiver_child = match receiver
        .stdin(stream)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(source) => {
            reap(&mut sender_child);
            return Err(CommandError::Spawn {
                program: receiver_program,
                source,
            });
        }
    };

    let mut sender_transcript = String::new();
    let mut receiver_transcript = String::new();
    let (tx, rx) = unbounded::<(StreamSide, String)>();

    thread::scope(|scope| {
        if let Some(stderr) = sender_child.stderr.take() {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(stderr, StreamSide::Sender, &tx));
        }
        if let Some(stderr) = receiver_child.stderr.take() {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(stderr, StreamSide::Receiver, &tx));
        }
        drop(tx);

        for (side, line) in rx {
            relay(side, &line);
            let transcript = match side {
                StreamSide::Sender => &mut sender_transcript,
                StreamSide::Receiver => &mut receiver_transcript,
            };
            transcript.push_str(&line);
            transcript.push('\n');
        }
    });

    let sender_status = sender_child.wait().map_err(|source| CommandError::Io {
        program: sender_program,
        source,
    })?;
    let receiver_status = receiver_child.wait().map_err(|source| CommandError::Io {
        program: receiver_program,
        source,
    })?;

    Ok(PipelineOutput {
        sender: sender_status.into(),
        receiver: receiver_status.into(),
        sender_transcript,
        receiver_transcript,
    })
}

fn forward_lines(stream: impl Read, side: StreamSide, tx: &Sender<(StreamSide, String)>) {
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                let line = line.trim_end_matches(['\n', '\r']);
                if tx.send((side, line.to_owned())).is_err() {
                    break;
                }
            }
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}
