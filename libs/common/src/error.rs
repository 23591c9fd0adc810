//! Common error types

use thiserror::Error;

/// Error type shared by the ambient helpers (config loading, logging setup)
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::config("missing redis.url").to_string(),
            "Configuration error: missing redis.url"
        );
        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such dir").into();
        assert!(matches!(io, Error::Io(_)));
    }
}
