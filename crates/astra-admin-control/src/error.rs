//! Error types for the lifecycle orchestrator.
//!
//! Every error here propagates to the caller unmodified. The only failures
//! that never surface are transient resume-probe errors, which live in
//! [`crate::resume::ProbeError`] and are logged instead.

use std::time::Duration;

use astra_admin_core::{DatabaseId, DatabaseStatus};
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in lifecycle operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The request was malformed. Raised before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The referenced database does not exist.
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    /// The database did not become active within the activation budget.
    #[error(
        "database {database_id} is not active after {waited:?} (last status: {last_status})"
    )]
    Timeout {
        /// The database being waited on.
        database_id: DatabaseId,
        /// How long the poller waited.
        waited: Duration,
        /// The status observed on the final check.
        last_status: DatabaseStatus,
    },

    /// The database exists but is in a status that cannot be activated.
    #[error("database {database_id} exists but cannot be activated from status {status}")]
    IllegalState {
        /// The database.
        database_id: DatabaseId,
        /// The observed status.
        status: DatabaseStatus,
    },

    /// The resume probe was rejected with a hard server failure.
    #[error("cannot resume database {0}, please check your account")]
    CannotResume(DatabaseId),

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// The control plane rejected a request.
    #[error("control plane error ({status}): {message}")]
    Api {
        /// HTTP status returned.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// The request could not be delivered.
    #[error("transport error: {0}")]
    Transport(String),

    /// The control plane returned something that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Credential error.
    #[error("authentication error: {0}")]
    Auth(#[from] astra_admin_auth::AuthError),

    /// Core type error.
    #[error(transparent)]
    Core(#[from] astra_admin_core::CoreError),
}

impl ControlError {
    /// Returns true if retrying the whole call might succeed.
    ///
    /// Nothing in this crate retries on its own; this is a hint for callers.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ControlError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
