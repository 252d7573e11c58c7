use perft_protocol::find_bytes;

/// Everything the engine has written so far. Only ever appended to.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Finds `pattern` at or after `from`, returning the index just past
    /// the match.
    pub fn find_end_of(&self, pattern: &[u8], from: usize) -> Option<usize> {
        find_bytes(&self.bytes, pattern, from).map(|index| index + pattern.len())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::OutputBuffer;

    #[test]
    fn matches_across_chunks() {
        let mut buffer = OutputBuffer::new();
        buffer.append(b"perft 1\r\nqu");
        assert!(buffer.find_end_of(b"quit", 0).is_none());

        buffer.append(b"it\r\n");
        assert!(buffer.find_end_of(b"quit", 0) == Some(13));
        assert!(buffer.len() == 15);
    }

    #[test]
    fn ignores_matches_before_cursor() {
        let mut buffer = OutputBuffer::new();
        buffer.append(b"quit\nquit\n");

        assert!(buffer.find_end_of(b"quit", 1) == Some(9));
        assert!(buffer.find_end_of(b"quit", 6).is_none());
    }
}
