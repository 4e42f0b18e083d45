use std::fmt;

/// Error type for filter configuration and processing.
///
/// Every failure is a caller mistake (bad coefficients, unsupported format,
/// undersized buffers), so there is a single kind. The payload names the
/// check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument failed validation
    InvalidArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
