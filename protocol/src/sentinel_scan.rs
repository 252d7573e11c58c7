use std::fmt::Display;
use std::ops::Range;

use crate::{find_bytes, LineEnding, PerftCommand};

pub const DEFAULT_SENTINEL: &str = PerftCommand::QUIT;
/// Control bytes terminating the engine's output that are not part of
/// the result.
pub const DEFAULT_TRAILING_BYTES: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractErr {
    /// The sentinel does not occur anywhere in the buffer.
    SentinelNotFound,
    /// The sentinel was found, but the configured line ending does not
    /// follow it.
    UnexpectedLineEnding { sentinel_at: usize },
    /// The computed bounds do not describe a slice of the buffer.
    MalformedSlice { start: usize, end: usize, len: usize },
    /// The bytes dropped from the end of the buffer are not control
    /// bytes, so dropping them would cut into the result.
    UnexpectedTrailingBytes { end: usize },
}

impl ExtractErr {
    /// The span of the buffer the error refers to, for diagnostics.
    pub fn span(&self, sentinel_len: usize, buffer_len: usize) -> Range<usize> {
        match self {
            ExtractErr::SentinelNotFound => buffer_len.saturating_sub(1)..buffer_len,
            ExtractErr::UnexpectedLineEnding { sentinel_at } => {
                *sentinel_at..(sentinel_at + sentinel_len).min(buffer_len)
            }
            ExtractErr::MalformedSlice { start, end, len } => {
                let from = (*start).min(*end).min(*len);
                from..(*len)
            }
            ExtractErr::UnexpectedTrailingBytes { end } => (*end).min(buffer_len)..buffer_len,
        }
    }
}

impl Display for ExtractErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractErr::SentinelNotFound => {
                write!(f, "Sentinel not found in engine output")
            }
            ExtractErr::UnexpectedLineEnding { sentinel_at } => write!(
                f,
                "Sentinel at byte {} is not followed by the expected line ending",
                sentinel_at
            ),
            ExtractErr::MalformedSlice { start, end, len } => write!(
                f,
                "Result bounds {}..{} do not fit an output of {} bytes",
                start, end, len
            ),
            ExtractErr::UnexpectedTrailingBytes { end } => write!(
                f,
                "Output does not end in control bytes after byte {}; the result would be cut short",
                end
            ),
        }
    }
}

impl std::error::Error for ExtractErr {}

/// Locates the result in the engine's output: everything after the
/// first sentinel line, minus the control bytes that terminate the
/// stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelScan {
    sentinel: String,
    line_ending: LineEnding,
    trailing_bytes: usize,
}

impl Default for SentinelScan {
    fn default() -> Self {
        Self::new(LineEnding::default(), DEFAULT_TRAILING_BYTES)
    }
}

impl SentinelScan {
    pub fn new(line_ending: LineEnding, trailing_bytes: usize) -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            line_ending,
            trailing_bytes,
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn trailing_bytes(&self) -> usize {
        self.trailing_bytes
    }

    /// Bytes skipped from the start of the sentinel to the start of the
    /// result.
    pub fn skip_len(&self) -> usize {
        self.sentinel.len() + self.line_ending.len()
    }

    pub fn bounds(&self, buffer: &[u8]) -> Result<Range<usize>, ExtractErr> {
        let sentinel_at = find_bytes(buffer, self.sentinel.as_bytes(), 0)
            .ok_or(ExtractErr::SentinelNotFound)?;

        let marker_at = sentinel_at + self.sentinel.len();
        let start = sentinel_at + self.skip_len();
        match buffer.get(marker_at..start) {
            Some(marker) if marker == self.line_ending.as_bytes() => {}
            _ => return Err(ExtractErr::UnexpectedLineEnding { sentinel_at }),
        }

        let len = buffer.len();
        let malformed = ExtractErr::MalformedSlice {
            start,
            end: len.saturating_sub(self.trailing_bytes),
            len,
        };
        let end = len.checked_sub(self.trailing_bytes).ok_or(malformed.clone())?;
        if start > end {
            return Err(malformed);
        }
        if !buffer[end..]
            .iter()
            .all(|byte| byte.is_ascii_control() || byte.is_ascii_whitespace())
        {
            return Err(ExtractErr::UnexpectedTrailingBytes { end });
        }

        Ok(start..end)
    }

    pub fn extract<'b>(&self, buffer: &'b [u8]) -> Result<&'b [u8], ExtractErr> {
        let range = self.bounds(buffer)?;
        Ok(&buffer[range])
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtractErr, SentinelScan};
    use crate::LineEnding;

    #[test]
    fn extracts_after_echoed_quit() {
        let buffer = b"position fen x moves \r\nperft 1\r\nquit\r\n20\n";
        let result = SentinelScan::default().extract(buffer).unwrap();

        assert!(result == b"20");
    }

    #[test]
    fn uses_first_sentinel() {
        let buffer = b"perft 2\nquit\nquit 400\n";
        let result = SentinelScan::new(LineEnding::Lf, 1).extract(buffer).unwrap();

        assert!(result == b"quit 400");
    }

    #[test]
    fn keeps_divide_block_intact() {
        let buffer = b"perft 1\nquit\na2a3 1\nb2b3 1\n\n2\n";
        let result = SentinelScan::new(LineEnding::Lf, 1).extract(buffer).unwrap();

        assert!(result == b"a2a3 1\nb2b3 1\n\n2");
    }

    #[test]
    fn reports_missing_sentinel() {
        let err = SentinelScan::default()
            .extract(b"position fen x moves \r\n")
            .unwrap_err();

        assert!(err == ExtractErr::SentinelNotFound);
    }

    #[test]
    fn reports_empty_buffer() {
        let err = SentinelScan::default().extract(b"").unwrap_err();

        assert!(err == ExtractErr::SentinelNotFound);
    }

    #[test]
    fn rejects_start_past_end() {
        // Nothing but the echo: the result would start past the last byte.
        let err = SentinelScan::new(LineEnding::Lf, 1)
            .extract(b"perft 1\nquit\n")
            .unwrap_err();

        assert!(
            err == ExtractErr::MalformedSlice {
                start: 13,
                end: 12,
                len: 13
            }
        );
    }

    #[test]
    fn rejects_trailing_count_beyond_buffer() {
        let err = SentinelScan::new(LineEnding::Lf, 10)
            .extract(b"quit\n1\n")
            .unwrap_err();

        assert!(matches!(err, ExtractErr::MalformedSlice { .. }));
    }

    #[test]
    fn rejects_mismatched_line_ending() {
        let err = SentinelScan::default()
            .extract(b"perft 1\nquit\n20\n")
            .unwrap_err();

        assert!(err == ExtractErr::UnexpectedLineEnding { sentinel_at: 8 });
    }

    #[test]
    fn rejects_unterminated_result() {
        // Dropping the last byte here would turn 20 into 2.
        let err = SentinelScan::default()
            .extract(b"perft 1\r\nquit\r\n20")
            .unwrap_err();

        assert!(err == ExtractErr::UnexpectedTrailingBytes { end: 16 });
        assert!(err.span(4, 17) == (16..17));
    }

    #[test]
    fn drops_only_control_bytes() {
        let scan = SentinelScan::new(LineEnding::CrLf, 2);

        assert!(scan.extract(b"quit\r\n400\r\n").unwrap() == b"400");
        assert!(scan.extract(b"quit\r\n400 \n").unwrap() == b"400");
        assert!(scan.extract(b"quit\r\n400\n").is_err());
    }

    #[test]
    fn rejects_sentinel_at_end_of_buffer() {
        let err = SentinelScan::default().extract(b"perft 1\r\nquit").unwrap_err();

        assert!(err == ExtractErr::UnexpectedLineEnding { sentinel_at: 9 });
    }

    #[test]
    fn extraction_is_pure() {
        let buffer = b"quit\r\n400\n";
        let scan = SentinelScan::default();

        assert!(scan.extract(buffer).unwrap() == scan.extract(buffer).unwrap());
    }

    #[test]
    fn custom_sentinel_shifts_skip() {
        let scan = SentinelScan::new(LineEnding::CrLf, 0).with_sentinel("done");

        assert!(scan.skip_len() == 6);
        assert!(scan.extract(b"done\r\n8902").unwrap() == b"8902");
    }
}
