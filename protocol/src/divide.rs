use std::fmt::Display;

/// Perft output broken down by root move, as printed by engines in
/// "divide" layout:
///
/// ```text
/// a2a3 1
/// b2b3 1
///
/// 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivideReport {
    pub moves: Vec<(String, u64)>,
    pub total: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DivideErr {
    /// No total was found.
    Empty,
    /// A line could not be read as `<move> <nodes>`. The index is
    /// 0-based and counts every line of the input.
    MalformedLine { line_index: usize },
    /// The last non-empty line is not a node count.
    MalformedTotal { line_index: usize },
}

impl Display for DivideErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DivideErr::Empty => write!(f, "Perft output is empty"),
            DivideErr::MalformedLine { line_index } => write!(
                f,
                "Failed to parse perft output. Expected '<move> <nodes>' on line {} (0-indexed)",
                line_index
            ),
            DivideErr::MalformedTotal { line_index } => write!(
                f,
                "Failed to parse perft output. Expected a node count on line {} (0-indexed)",
                line_index
            ),
        }
    }
}

impl std::error::Error for DivideErr {}

impl DivideReport {
    pub fn parse(text: &str) -> Result<Self, DivideErr> {
        let lines = text
            .lines()
            .map(|line| line.trim())
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .collect::<Vec<_>>();

        let Some((&(total_index, total_line), move_lines)) = lines.split_last() else {
            return Err(DivideErr::Empty);
        };

        let total = total_line
            .parse::<u64>()
            .map_err(|_| DivideErr::MalformedTotal {
                line_index: total_index,
            })?;

        let mut moves = Vec::with_capacity(move_lines.len());
        for &(line_index, line) in move_lines {
            let mut parts = line.split_whitespace();
            let (Some(move_), Some(nodes), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(DivideErr::MalformedLine { line_index });
            };

            // Some engines print `e2e4: 20`.
            let move_ = move_.strip_suffix(':').unwrap_or(move_);
            let nodes = nodes
                .parse::<u64>()
                .map_err(|_| DivideErr::MalformedLine { line_index })?;
            moves.push((move_.to_string(), nodes));
        }

        Ok(Self { moves, total })
    }

    /// The sum of the per-move counts. Differs from `total` only when the
    /// engine's output is inconsistent.
    pub fn move_sum(&self) -> u64 {
        self.moves.iter().map(|(_, nodes)| nodes).sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.moves.is_empty() || self.move_sum() == self.total
    }
}
