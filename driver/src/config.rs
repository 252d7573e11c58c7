use std::time::Duration;

use perft_protocol::{LineEnding, SentinelScan, DEFAULT_TRAILING_BYTES};

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(600);

/// The program started as the engine, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub engine: EngineCommandLine,
    pub line_ending: LineEnding,
    /// Bound on waiting for the echo of one sent command.
    pub sync_timeout: Duration,
    /// Bound on reading the rest of the output once `quit` is confirmed.
    pub capture_timeout: Duration,
    pub trailing_bytes: usize,
}

impl DriverConfig {
    pub fn new(engine: EngineCommandLine) -> Self {
        Self {
            engine,
            line_ending: LineEnding::default(),
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
            trailing_bytes: DEFAULT_TRAILING_BYTES,
        }
    }

    pub fn sentinel_scan(&self) -> SentinelScan {
        SentinelScan::new(self.line_ending, self.trailing_bytes)
    }
}
