mod command;
pub use command::{CommandRequest, EngineCommand, InitCommand, PerftCommand};
mod line_ending;
pub use line_ending::{LineEnding, LineEndingErr};
mod sentinel_scan;
pub use sentinel_scan::{ExtractErr, SentinelScan, DEFAULT_SENTINEL, DEFAULT_TRAILING_BYTES};
mod divide;
pub use divide::{DivideErr, DivideReport};

pub fn parse_divide(text: &str) -> Result<DivideReport, DivideErr> {
    DivideReport::parse(text)
}

/// Returns the index of the first occurrence of `needle` in
/// `haystack` at or after `from`.
pub fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return if from <= haystack.len() {
            Some(from)
        } else {
            None
        };
    }

    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|index| index + from)
}

#[cfg(test)]
mod tests {
    use super::find_bytes;

    #[test]
    fn finds_first_occurrence() {
        assert!(find_bytes(b"quit quit", b"quit", 0) == Some(0));
        assert!(find_bytes(b"quit quit", b"quit", 1) == Some(5));
        assert!(find_bytes(b"perft 1", b"quit", 0).is_none());
    }

    #[test]
    fn handles_out_of_range_start() {
        assert!(find_bytes(b"abc", b"c", 10).is_none());
        assert!(find_bytes(b"abc", b"", 3) == Some(3));
        assert!(find_bytes(b"abc", b"", 4).is_none());
    }
}
