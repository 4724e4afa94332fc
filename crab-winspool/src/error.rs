//! Error types for the spooler binding

use thiserror::Error;

/// Spooler error types
#[derive(Debug, Error)]
pub enum SpoolError {
    /// An OS spooler call failed; the OS error code is kept as-is
    #[error("{call} failed: {source}")]
    Os {
        call: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A result buffer could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The fill call returned a different element count than the sizing call
    #[error("Count mismatch: sizing call reported {expected}, fill returned {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

impl SpoolError {
    pub(crate) fn os(call: &'static str, source: std::io::Error) -> Self {
        Self::Os { call, source }
    }

    /// Raw OS error code, if this is an OS call failure
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Os { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

impl From<SpoolError> for std::io::Error {
    fn from(err: SpoolError) -> Self {
        match err {
            SpoolError::Os { source, .. } => source,
            other => std::io::Error::other(other),
        }
    }
}

/// Result type for spooler operations
pub type SpoolResult<T> = Result<T, SpoolError>;
