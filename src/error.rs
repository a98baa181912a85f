//! Error handling for the RMS estimators.
//!
//! Errors carry a coarse [`ErrorKind`] modelled on gRPC status codes, plus the
//! underlying cause. Estimators only fail on caller contract violations, such
//! as a frequency outside the configured range. Everything else in this crate
//! is configuration loading.
//!
//! # Example
//!
//! ```rust
//! use rmscalc::error::{Error, ErrorKind};
//!
//! let error = Error::out_of_range("window exceeds capacity");
//! assert_eq!(error.kind, ErrorKind::OutOfRange);
//! ```

use std::{fmt, io};

/// Result type carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error with a classification and its underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {error}")]
pub struct Error {
    /// Classification of the error.
    pub kind: ErrorKind,

    /// The underlying cause.
    #[source]
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

/// Error classification.
///
/// A subset of the gRPC status codes, trimmed to what estimation and
/// configuration loading can produce.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Unclassified error.
    Unknown,

    /// A malformed value was supplied, for example an unparsable configuration.
    InvalidArgument,

    /// A requested file or entity was not found.
    NotFound,

    /// Access to a resource was denied.
    PermissionDenied,

    /// A value is well-formed but outside its valid range, for example a
    /// frequency below the configured minimum.
    OutOfRange,

}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::InvalidArgument => "invalid argument",
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::OutOfRange => "out of range",
        };

        f.write_str(s)
    }
}

impl Error {
    /// Creates an error of the given kind from any error or message.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            error: error.into(),
        }
    }

    pub fn invalid_argument<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::InvalidArgument, error)
    }

    pub fn out_of_range<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::OutOfRange, error)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => ErrorKind::InvalidArgument,
            _ => ErrorKind::Unknown,
        };

        Self::new(kind, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_argument(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_cause() {
        let error = Error::out_of_range("window of 300 samples exceeds capacity of 51");
        assert_eq!(
            error.to_string(),
            "out of range: window of 300 samples exceeds capacity of 51"
        );
    }

    #[test]
    fn io_errors_map_to_kinds() {
        let missing = Error::from(io::Error::new(io::ErrorKind::NotFound, "rmscalc.toml"));
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let garbled = Error::from(io::Error::new(io::ErrorKind::InvalidData, "not UTF-8"));
        assert_eq!(garbled.kind, ErrorKind::InvalidArgument);

        let other = Error::from(io::Error::other("disk on fire"));
        assert_eq!(other.kind, ErrorKind::Unknown);
    }
}
