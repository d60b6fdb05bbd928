//! Common error types for astra-admin.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout astra-admin.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cloud provider name was not recognized.
    #[error("unknown cloud provider: {0}")]
    UnknownCloudProvider(String),

    /// An environment name was not recognized.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
}
