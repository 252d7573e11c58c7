use std::fmt::Display;
use std::io;
use std::time::Duration;

use perft_protocol::ExtractErr;

use super::state::SessionState;

/// The classes of failure a session reports to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SpawnFailure,
    SynchronizationTimeout,
    /// The result cannot be located in the engine's output. Covers a
    /// missing sentinel, a malformed slice and an engine that went away
    /// before echoing.
    SentinelNotFound,
}

impl ErrorKind {
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::SpawnFailure => 1,
            ErrorKind::SynchronizationTimeout => 2,
            ErrorKind::SentinelNotFound => 3,
        }
    }
}

#[derive(Debug)]
pub enum SessionErr {
    /// The engine process could not be started.
    Spawn { program: String, source: io::Error },
    /// `awaiting` did not show up in the engine's output in time.
    Timeout {
        state: SessionState,
        awaiting: String,
        waited: Duration,
    },
    /// The engine closed its output before `awaiting` was seen.
    EngineClosed { awaiting: String },
    /// Writing to the engine failed, usually because it already exited.
    Write { source: io::Error },
    /// The result could not be cut out of the captured output.
    Extract { err: ExtractErr, captured: Vec<u8> },
}

impl SessionErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionErr::Spawn { .. } => ErrorKind::SpawnFailure,
            SessionErr::Timeout { .. } => ErrorKind::SynchronizationTimeout,
            SessionErr::EngineClosed { .. }
            | SessionErr::Write { .. }
            | SessionErr::Extract { .. } => ErrorKind::SentinelNotFound,
        }
    }

    /// The captured output, when the failure happened while scanning it.
    pub fn captured(&self) -> Option<&[u8]> {
        match self {
            SessionErr::Extract { captured, .. } => Some(captured),
            _ => None,
        }
    }
}

impl Display for SessionErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionErr::Spawn { program, source } => {
                write!(f, "Failed to start engine '{}'. Inner error: {}", program, source)
            }
            SessionErr::Timeout {
                state,
                awaiting,
                waited,
            } => write!(
                f,
                "Timed out after {}ms in state {} waiting for {:?}",
                waited.as_millis(),
                state,
                awaiting
            ),
            SessionErr::EngineClosed { awaiting } => write!(
                f,
                "Engine closed its output while waiting for {:?}; no result to extract",
                awaiting
            ),
            SessionErr::Write { source } => {
                write!(f, "Failed to write to engine. Inner error: {}", source)
            }
            SessionErr::Extract { err, .. } => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionErr::Spawn { source, .. } | SessionErr::Write { source } => Some(source),
            SessionErr::Extract { err, .. } => Some(err),
            _ => None,
        }
    }
}
