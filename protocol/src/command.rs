use crate::LineEnding;

/// The inputs of one perft query. Built once from the command line
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    depth: u32,
    fen: String,
    moves: Vec<String>,
}

impl CommandRequest {
    pub fn new(depth: u32, fen: impl Into<String>, moves: Vec<String>) -> Self {
        Self {
            depth,
            fen: fen.into(),
            moves,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn init_command(&self) -> InitCommand {
        InitCommand::new(&self.fen, &self.moves)
    }

    pub fn perft_command(&self) -> PerftCommand {
        PerftCommand::new(self.depth)
    }
}

/// A payload of one or more protocol lines sent to the engine in a
/// single write.
pub trait EngineCommand {
    /// The lines of the payload, without line endings. The engine is
    /// expected to echo each of them in order.
    fn lines(&self) -> Vec<&str>;

    /// Encodes the payload with every line terminated by `line_ending`.
    fn encode(&self, line_ending: LineEnding) -> Vec<u8> {
        let mut bytes = Vec::new();
        for line in self.lines() {
            bytes.extend_from_slice(line.as_bytes());
            bytes.extend_from_slice(line_ending.as_bytes());
        }
        bytes
    }
}

/// `position fen <fen> moves <moves>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommand(String);

impl InitCommand {
    pub fn new(fen: &str, moves: &[String]) -> Self {
        // The moves clause is kept even when there are no moves.
        Self(format!("position fen {} moves {}", fen, moves.join(" ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EngineCommand for InitCommand {
    fn lines(&self) -> Vec<&str> {
        vec![self.0.as_str()]
    }
}

/// `perft <depth>` followed by `quit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerftCommand {
    perft_line: String,
}

impl PerftCommand {
    pub const QUIT: &'static str = "quit";

    pub fn new(depth: u32) -> Self {
        Self {
            perft_line: format!("perft {}", depth),
        }
    }
}

impl EngineCommand for PerftCommand {
    fn lines(&self) -> Vec<&str> {
        vec![self.perft_line.as_str(), Self::QUIT]
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandRequest, EngineCommand};
    use crate::LineEnding;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn builds_init_command_with_moves() {
        let request = CommandRequest::new(
            3,
            START_FEN,
            vec!["e2e4".to_string(), "e7e5".to_string()],
        );

        assert!(
            request.init_command().as_str()
                == "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 moves e2e4 e7e5"
        );
    }

    #[test]
    fn keeps_moves_clause_without_moves() {
        let request = CommandRequest::new(1, START_FEN, Vec::new());
        let init = request.init_command();

        assert!(init.as_str().ends_with(" moves "));
        assert!(init.lines() == vec![init.as_str()]);
    }

    #[test]
    fn passes_grouped_moves_through() {
        // perftree hands every move over in a single argument
        let request = CommandRequest::new(2, START_FEN, vec!["e2e4 e7e5 g1f3".to_string()]);

        assert!(request
            .init_command()
            .as_str()
            .ends_with(" moves e2e4 e7e5 g1f3"));
    }

    #[test]
    fn builds_perft_payload() {
        let perft = CommandRequest::new(0, START_FEN, Vec::new()).perft_command();

        assert!(perft.lines() == vec!["perft 0", "quit"]);
        assert!(perft.encode(LineEnding::CrLf) == b"perft 0\r\nquit\r\n".to_vec());
        assert!(perft.encode(LineEnding::Lf) == b"perft 0\nquit\n".to_vec());
    }
}
