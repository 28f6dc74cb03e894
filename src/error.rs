use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the codex application.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Transport-level API failure (connection, timeout, malformed body).
    #[error("API request failed: {message}")]
    Api {
        /// Error message
        message: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the error envelope, or the raw body
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a transport-level API error.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Api {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_includes_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/missing.rs", io_err);
        assert!(err.to_string().contains("/tmp/missing.rs"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn status_error_includes_code() {
        let err = Error::Status {
            status: 401,
            message: "invalid x-api-key".into(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid x-api-key"));
    }
}
