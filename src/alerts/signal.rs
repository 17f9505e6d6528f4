//! The alert bit

use std::fmt;
use std::io::Write;

/// Outcome of a successful check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSignal {
    /// Count reached the threshold
    Triggered,
    /// Count stayed below the threshold
    Clear,
}

impl AlertSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSignal::Triggered => "1",
            AlertSignal::Clear => "0",
        }
    }

    /// Write the bit with no trailing newline and flush
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.as_str().as_bytes())?;
        out.flush()
    }
}

impl fmt::Display for AlertSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
