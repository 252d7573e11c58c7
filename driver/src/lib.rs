mod config;
pub use config::{DriverConfig, EngineCommandLine, DEFAULT_CAPTURE_TIMEOUT, DEFAULT_SYNC_TIMEOUT};
mod engine_link;
pub use engine_link::{EngineLink, EngineProcess, Recv};
mod output_buffer;
pub use output_buffer::OutputBuffer;
mod session;
pub use session::{ErrorKind, Session, SessionErr, SessionState};

use log::{debug, warn};
use perft_protocol::{CommandRequest, DivideReport};

/// Spawns the configured engine, runs one perft query against it and
/// returns the extracted result. The engine is gone when this returns.
pub fn run_perft(request: &CommandRequest, config: DriverConfig) -> Result<String, SessionErr> {
    let mut session = Session::spawn(config)?;
    session.run(request)
}

/// Reads `result` as a divide report, logging a warning when the
/// per-move counts do not add up to the total.
pub fn divide_report(result: &str) -> Option<DivideReport> {
    match perft_protocol::parse_divide(result) {
        Ok(report) => {
            if !report.is_consistent() {
                warn!(
                    "Engine reported {} nodes but its moves add up to {}",
                    report.total,
                    report.move_sum()
                );
            }
            debug!(
                "Perft result: {} root moves, {} nodes",
                report.moves.len(),
                report.total
            );
            Some(report)
        }
        Err(err) => {
            debug!("Result is not a divide report. Inner error: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::divide_report;

    #[test]
    fn reads_divide_results() {
        let report = divide_report("a2a3 1\nb2b3 1\n\n2").unwrap();

        assert!(report.total == 2);
        assert!(divide_report("no nodes here").is_none());
    }
}
