//! Authentication error types.

use std::path::PathBuf;

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while resolving credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token was supplied and none could be found in the environment or config file.
    #[error("no application token found (checked explicit value, ${env_var}, and {rc_path})")]
    MissingToken {
        /// The environment variable that was consulted.
        env_var: String,
        /// The config file that was consulted.
        rc_path: String,
    },

    /// A token was supplied but is empty or blank.
    #[error("application token is empty")]
    EmptyToken,

    /// The token contains characters that cannot be sent in an HTTP header.
    #[error("application token contains invalid characters")]
    InvalidToken,

    /// The config file exists but could not be read.
    #[error("failed to read {}: {}", .path.display(), .source)]
    ConfigRead {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("malformed config at line {line}: {message}")]
    ConfigParse {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
}

impl AuthError {
    /// Returns `true` if the error means no credential was available at all.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::MissingToken { .. })
    }
}
