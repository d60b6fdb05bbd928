//! Credential resolution for astra-admin.
//!
//! The admin client authenticates every request with an application token.
//! The token is resolved once, by the caller, from the first source that has
//! one:
//!
//! 1. an explicit value (flag, constructor argument)
//! 2. the `ASTRA_DB_APPLICATION_TOKEN` environment variable
//! 3. the `[default]` section of `~/.astrarc`
//!
//! The resolved [`Token`] is then handed to the control crate at
//! construction. Nothing is cached globally.
//!
//! # Example
//!
//! ```no_run
//! use astra_admin_auth::{resolve_token, TokenConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolved = resolve_token(&TokenConfig::default(), None)?;
//! println!("using token {} from {:?}", resolved.token, resolved.source);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod astrarc;
pub mod error;
pub mod token;

use std::path::PathBuf;

pub use astrarc::AstraRc;
pub use error::{AuthError, Result};
pub use token::Token;

/// Environment variable holding the application token.
pub const TOKEN_ENV_VAR: &str = "ASTRA_DB_APPLICATION_TOKEN";

/// Where to look for a token when none is given explicitly.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Environment variable to consult.
    pub env_var: String,
    /// Path of the `.astrarc` file; `None` disables the file lookup.
    pub astrarc_path: Option<PathBuf>,
    /// Section of the `.astrarc` file to read.
    pub section: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            env_var: TOKEN_ENV_VAR.to_string(),
            astrarc_path: AstraRc::default_path(),
            section: astrarc::DEFAULT_SECTION.to_string(),
        }
    }
}

/// Where a resolved token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Supplied explicitly by the caller.
    Explicit,
    /// Read from the named environment variable.
    Environment(String),
    /// Read from the config file at this path.
    ConfigFile(PathBuf),
}

/// A token together with the source it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    /// The token.
    pub token: Token,
    /// Where it was found.
    pub source: TokenSource,
}

/// Resolve a token using the process environment.
///
/// # Errors
///
/// Returns `AuthError::MissingToken` when no source has a token, or the error
/// of the first source that has an unusable one.
pub fn resolve_token(config: &TokenConfig, explicit: Option<&str>) -> Result<ResolvedToken> {
    resolve_token_with(config, explicit, |key| std::env::var(key).ok())
}

/// Resolve a token with a custom environment lookup.
///
/// Precedence is explicit value, then environment, then config file. Blank
/// values are treated as absent so an empty variable does not shadow the file.
///
/// # Errors
///
/// See [`resolve_token`].
pub fn resolve_token_with<F>(
    config: &TokenConfig,
    explicit: Option<&str>,
    lookup_env: F,
) -> Result<ResolvedToken>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = explicit.filter(|v| !v.trim().is_empty()) {
        tracing::debug!("using explicit application token");
        return Ok(ResolvedToken {
            token: Token::new(value)?,
            source: TokenSource::Explicit,
        });
    }

    if let Some(value) = lookup_env(&config.env_var).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(env_var = %config.env_var, "using application token from environment");
        return Ok(ResolvedToken {
            token: Token::new(value)?,
            source: TokenSource::Environment(config.env_var.clone()),
        });
    }

    if let Some(path) = &config.astrarc_path {
        if let Some(rc) = AstraRc::load(path)? {
            if let Some(value) = rc
                .get(&config.section, &config.env_var)
                .filter(|v| !v.trim().is_empty())
            {
                tracing::debug!(
                    path = %path.display(),
                    section = %config.section,
                    "using application token from config file"
                );
                return Ok(ResolvedToken {
                    token: Token::new(value)?,
                    source: TokenSource::ConfigFile(path.clone()),
                });
            }
        }
    }

    Err(AuthError::MissingToken {
        env_var: config.env_var.clone(),
        rc_path: config
            .astrarc_path
            .as_ref()
            .map_or_else(|| "<no config file>".to_string(), |p| p.display().to_string()),
    })
}
