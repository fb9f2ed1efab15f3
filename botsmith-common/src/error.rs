//! Error types for the Botsmith services.

use thiserror::Error;

/// Result type alias using the Botsmith error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Botsmith services.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential, empty model list, bad caps)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Quota exceeded
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// External service error
    #[error("External service error: {0}")]
    External(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a rate limit or quota error.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::QuotaExceeded(_))
    }

    /// Get the HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 503,
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::RateLimited(_) | Self::QuotaExceeded(_) => 429,
            Self::External(_) => 502,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::Config("test".into()).status_code(), 503);
        assert_eq!(Error::NotFound("test".into()).status_code(), 404);
        assert_eq!(Error::InvalidInput("test".into()).status_code(), 400);
        assert_eq!(Error::RateLimited("test".into()).status_code(), 429);
        assert_eq!(Error::QuotaExceeded("test".into()).status_code(), 429);
        assert_eq!(Error::External("test".into()).status_code(), 502);
        assert_eq!(Error::Internal("test".into()).status_code(), 500);
        assert_eq!(
            Error::Io(std::io::Error::other("disk gone")).status_code(),
            500
        );
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(Error::RateLimited("x".into()).is_rate_limited());
        assert!(Error::QuotaExceeded("x".into()).is_rate_limited());
        assert!(!Error::Internal("x".into()).is_rate_limited());
    }
}
