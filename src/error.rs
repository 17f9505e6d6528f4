//! Failure taxonomy for a single check

/// Anything that stops a check from producing an alert bit.
///
/// Callers outside the crate only need to know that the check failed; the
/// variants exist for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Response has no count field")]
    MissingCount,

    #[error("Count is not a non-negative integer: {0}")]
    InvalidCount(String),

    #[error("Failed to write signal: {0}")]
    Output(#[from] std::io::Error),
}
