//! Application token type.

use std::fmt;

use crate::error::{AuthError, Result};

/// An application token used as a bearer credential.
///
/// `Debug` and `Display` redact the secret so tokens never land in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Prefix carried by tokens issued for Astra organizations.
    pub const ASTRA_CS_PREFIX: &'static str = "AstraCS:";

    /// Create a token from a raw string.
    ///
    /// Surrounding whitespace is stripped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyToken` if the value is blank, or
    /// `AuthError::InvalidToken` if it contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(AuthError::InvalidToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the raw secret, for building request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Returns `true` if the token has the organization token prefix.
    #[must_use]
    pub fn is_astra_cs(&self) -> bool {
        self.0.starts_with(Self::ASTRA_CS_PREFIX)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({self})")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_astra_cs() {
            write!(f, "{}***", Self::ASTRA_CS_PREFIX)
        } else {
            f.write_str("***")
        }
    }
}
