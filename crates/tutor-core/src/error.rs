use thiserror::Error;

/// Failure taxonomy for the tutoring pipeline.
///
/// Degradation (one retrieval source unavailable) is deliberately not a
/// variant: it is recovered locally with a logged warning and a fallback to
/// the remaining source.
#[derive(Debug, Error)]
pub enum Error {
    /// Fatal to the current operation but recoverable by operator action;
    /// the message carries the remediation.
    #[error("Setup required: {0}")]
    Setup(String),

    /// The external generation service returned non-conforming structured
    /// output. Recovered locally by substituting a placeholder record.
    #[error("Malformed generation output: {0}")]
    Parse(String),

    /// An external service call failed. The interactive loop catches this,
    /// shows a message and keeps accepting queries.
    #[error("Transient service failure: {0}")]
    Transient(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
