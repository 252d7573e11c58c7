mod session_err;
pub use session_err::{ErrorKind, SessionErr};
mod state;
pub use state::SessionState;

use std::time::{Duration, Instant};

use log::{debug, trace};
use perft_protocol::{CommandRequest, EngineCommand};

use crate::{DriverConfig, EngineLink, EngineProcess, OutputBuffer, Recv};

const END_OF_OUTPUT: &str = "end of engine output";

/// One perft query against one engine, from spawn to extracted result.
///
/// Every command is echo-confirmed: after a write, the session reads
/// until the engine has echoed each sent line, in order, before it does
/// anything else. The echoes stay in the output buffer; the sentinel scan
/// skips past them at the end.
pub struct Session<L: EngineLink> {
    link: L,
    config: DriverConfig,
    buffer: OutputBuffer,
    /// Index just past the last confirmed echo.
    cursor: usize,
    state: SessionState,
}

impl Session<EngineProcess> {
    pub fn spawn(config: DriverConfig) -> Result<Self, SessionErr> {
        let link = EngineProcess::spawn(&config.engine)?;
        Ok(Self::with_link(link, config))
    }
}

impl<L: EngineLink> Session<L> {
    pub fn with_link(link: L, config: DriverConfig) -> Self {
        debug!("Session state {}", SessionState::Spawned);
        Self {
            link,
            config,
            buffer: OutputBuffer::new(),
            cursor: 0,
            state: SessionState::Spawned,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.buffer
    }

    /// Runs both exchanges, captures the output and extracts the result.
    /// Any error leaves the session `Failed`.
    pub fn run(&mut self, request: &CommandRequest) -> Result<String, SessionErr> {
        match self.run_exchanges(request) {
            Ok(result) => {
                self.advance();
                Ok(result)
            }
            Err(err) => {
                debug!("Session state {} after: {}", SessionState::Failed, err);
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    fn run_exchanges(&mut self, request: &CommandRequest) -> Result<String, SessionErr> {
        self.send_and_sync(&request.init_command())?;
        self.send_and_sync(&request.perft_command())?;
        self.capture()?;
        self.extract()
    }

    /// Sends `command` and waits until every one of its lines has been
    /// echoed back.
    pub fn send_and_sync(&mut self, command: &dyn EngineCommand) -> Result<(), SessionErr> {
        debug_assert!(matches!(
            self.state,
            SessionState::Spawned | SessionState::InitConfirmed
        ));

        for line in command.lines() {
            debug!("> {}", line);
        }
        self.link
            .send(&command.encode(self.config.line_ending))
            .map_err(|source| SessionErr::Write { source })?;
        self.advance();

        let bound = self.config.sync_timeout;
        let deadline = Instant::now() + bound;
        for line in command.lines() {
            self.cursor = self.await_echo(line, deadline, bound)?;
        }
        self.advance();

        Ok(())
    }

    /// Closes the engine's input and reads until the engine closes its
    /// output. Returns everything received during the session.
    pub fn capture(&mut self) -> Result<&[u8], SessionErr> {
        debug_assert!(self.state == SessionState::PerftConfirmed);

        self.link.close_input();

        let bound = self.config.capture_timeout;
        let deadline = Instant::now() + bound;
        loop {
            match self.recv_before(deadline) {
                Recv::Data(chunk) => self.buffer.append(&chunk),
                Recv::Timeout => return Err(self.timeout(END_OF_OUTPUT, bound)),
                Recv::Closed => break,
            }
        }

        debug!("Captured {} bytes of engine output", self.buffer.len());
        self.advance();
        Ok(self.buffer.as_bytes())
    }

    /// Cuts the result out of the captured output.
    pub fn extract(&mut self) -> Result<String, SessionErr> {
        let scan = self.config.sentinel_scan();
        let result = match scan.extract(self.buffer.as_bytes()) {
            Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Err(err) => {
                return Err(SessionErr::Extract {
                    err,
                    captured: self.buffer.as_bytes().to_vec(),
                })
            }
        };

        self.advance();
        Ok(result)
    }

    fn await_echo(
        &mut self,
        pattern: &str,
        deadline: Instant,
        bound: Duration,
    ) -> Result<usize, SessionErr> {
        loop {
            if let Some(end) = self.buffer.find_end_of(pattern.as_bytes(), self.cursor) {
                trace!("Echo of {:?} confirmed at byte {}", pattern, end);
                return Ok(end);
            }

            match self.recv_before(deadline) {
                Recv::Data(chunk) => self.buffer.append(&chunk),
                Recv::Timeout => return Err(self.timeout(pattern, bound)),
                Recv::Closed => {
                    return Err(SessionErr::EngineClosed {
                        awaiting: pattern.to_string(),
                    })
                }
            }
        }
    }

    fn recv_before(&mut self, deadline: Instant) -> Recv {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Recv::Timeout;
        }
        self.link.recv(remaining)
    }

    fn timeout(&self, awaiting: &str, waited: Duration) -> SessionErr {
        SessionErr::Timeout {
            state: self.state,
            awaiting: awaiting.to_string(),
            waited,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            debug!("Session state {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
