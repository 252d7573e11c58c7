use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use log::{debug, trace, warn};

use crate::{EngineCommandLine, SessionErr};

const READ_CHUNK_SIZE: usize = 4096;

/// What a bounded read from the engine produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Recv {
    Data(Vec<u8>),
    Timeout,
    /// The engine closed its output stream. Nothing more will arrive.
    Closed,
}

/// The two streams a session talks to the engine through.
pub trait EngineLink {
    /// Writes `bytes` to the engine's input and flushes it.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Closes the engine's input. Later sends fail.
    fn close_input(&mut self);
    /// Waits at most `timeout` for the next chunk of output.
    fn recv(&mut self, timeout: Duration) -> Recv;
}

/// A spawned engine. The child is killed and reaped when this is
/// dropped, whatever state the session ended in.
pub struct EngineProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    chunks: Receiver<Vec<u8>>,
}

impl EngineProcess {
    pub fn spawn(engine: &EngineCommandLine) -> Result<Self, SessionErr> {
        let spawn_err = |source| SessionErr::Spawn {
            program: engine.program.clone(),
            source,
        };

        let mut child = Command::new(&engine.program)
            .args(&engine.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_err(io::Error::new(
                io::ErrorKind::Other,
                "engine streams were not captured",
            )));
        };

        debug!("Spawned engine '{}' with pid {}", engine.program, child.id());

        Ok(Self {
            child,
            stdin: Some(stdin),
            chunks: spawn_reader(stdout),
        })
    }
}

/// Moves the engine's output onto a channel so reads can time out. The
/// sender is dropped, and the channel disconnects, once the stream ends.
fn spawn_reader(mut stdout: ChildStdout) -> Receiver<Vec<u8>> {
    let (tx, rx) = unbounded::<Vec<u8>>();
    thread::spawn(move || {
        let mut chunk = [0_u8; READ_CHUNK_SIZE];
        loop {
            match stdout.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => {
                    if tx.send(chunk[..read].to_vec()).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("Failed to read engine output. Inner error: {err}");
                    break;
                }
            }
        }
    });

    rx
}

impl EngineLink for EngineProcess {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine input already closed",
            ));
        };

        stdin.write_all(bytes)?;
        stdin.flush()
    }

    fn close_input(&mut self) {
        self.stdin.take();
    }

    fn recv(&mut self, timeout: Duration) -> Recv {
        match self.chunks.recv_timeout(timeout) {
            Ok(chunk) => {
                trace!("< {:?}", String::from_utf8_lossy(&chunk));
                Recv::Data(chunk)
            }
            Err(RecvTimeoutError::Timeout) => Recv::Timeout,
            Err(RecvTimeoutError::Disconnected) => Recv::Closed,
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        self.stdin.take();
        match self.child.try_wait() {
            Ok(Some(status)) => debug!("Engine exited with {status}"),
            _ => {
                let _ = self.child.kill();
                let _ = self.child.wait();
                debug!("Engine killed");
            }
        }
    }
}
