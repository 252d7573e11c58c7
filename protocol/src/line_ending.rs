use std::fmt::Display;
use std::str::FromStr;

/// The marker terminating every line sent to the engine, and the marker
/// expected to follow the echoed sentinel in its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    Lf,
    #[default]
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Width of the marker in bytes.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }
}

#[derive(Debug)]
pub struct LineEndingErr {
    value: String,
}

impl Display for LineEndingErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown line ending '{}'. Expected one of lf, crlf",
            self.value
        )
    }
}

impl std::error::Error for LineEndingErr {}

impl FromStr for LineEnding {
    type Err = LineEndingErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::CrLf),
            _ => Err(LineEndingErr {
                value: s.to_string(),
            }),
        }
    }
}

impl Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineEnding::Lf => write!(f, "lf"),
            LineEnding::CrLf => write!(f, "crlf"),
        }
    }
}
