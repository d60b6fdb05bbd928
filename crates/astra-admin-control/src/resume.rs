//! Resume trigger for hibernated databases.
//!
//! A hibernated database wakes up when its REST API is hit. The trigger
//! sends a single keyspace-listing request and does not care about the
//! answer, except for a hard server failure, which means the account cannot
//! resume databases at all.

use astra_admin_auth::{AuthError, Token};
use astra_admin_core::DatabaseRecord;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use thiserror::Error;

use crate::error::{ControlError, Result};
use crate::types::AdminConfig;

/// Header carrying the raw application token on the REST API.
const X_TOKEN: &str = "x-token";

/// Trait for waking hibernated databases.
#[async_trait]
pub trait ResumeTrigger: Send + Sync {
    /// Nudge a hibernated database so it starts resuming.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::CannotResume` if the server refuses outright.
    /// Every other probe failure is logged and swallowed.
    async fn resume(&self, record: &DatabaseRecord) -> Result<()>;
}

/// Why a resume probe did not get a success answer.
///
/// Only `Status(500)` is fatal; the rest are expected while a database is
/// still asleep.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe ran out of time.
    #[error("resume probe timed out")]
    Timeout,

    /// The database endpoint could not be reached.
    #[error("resume probe could not connect: {0}")]
    Connect(String),

    /// The endpoint answered with a non-success status.
    #[error("resume probe returned status {0}")]
    Status(u16),

    /// Any other request failure.
    #[error("resume probe failed: {0}")]
    Request(String),
}

impl ProbeError {
    /// Returns true if the account cannot resume databases at all.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Status(500))
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Resume trigger hitting the database's REST API.
#[derive(Debug, Clone)]
pub struct HttpResumeTrigger {
    client: reqwest::Client,
    config: AdminConfig,
    token: Token,
}

impl HttpResumeTrigger {
    /// Create a trigger bounded by the configured resume timeout.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig, token: Token) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.resume_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, config.clone(), token))
    }

    /// Create a trigger with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: AdminConfig, token: Token) -> Self {
        Self {
            client,
            config,
            token,
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let invalid = |_| ControlError::Auth(AuthError::InvalidToken);
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(X_TOKEN),
            HeaderValue::from_str(self.token.expose()).map_err(invalid)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.token.bearer()).map_err(invalid)?,
        );
        Ok(headers)
    }

    async fn probe(&self, url: &str, headers: HeaderMap) -> std::result::Result<(), ProbeError> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl ResumeTrigger for HttpResumeTrigger {
    async fn resume(&self, record: &DatabaseRecord) -> Result<()> {
        let url = self.config.resume_endpoint(&record.id, &record.region);
        let headers = self.headers()?;

        tracing::info!(database_id = %record.id, name = %record.name, "Resuming hibernated database");

        match self.probe(&url, headers).await {
            Ok(()) => {
                tracing::debug!(database_id = %record.id, "Resume probe accepted");
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(database_id = %record.id, error = %e, "Database cannot be resumed");
                Err(ControlError::CannotResume(record.id))
            }
            Err(e) => {
                tracing::warn!(database_id = %record.id, error = %e, "Resume probe failed, continuing");
                Ok(())
            }
        }
    }
}

/// Callback invoked by [`RecordingResumeTrigger`] on every resume.
#[cfg(any(test, feature = "test-utils"))]
pub type ResumeHook = std::sync::Arc<dyn Fn(&DatabaseRecord) + Send + Sync>;

/// Resume trigger that records calls instead of touching the network.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct RecordingResumeTrigger {
    resumed: parking_lot::Mutex<Vec<astra_admin_core::DatabaseId>>,
    refuse: bool,
    hook: Option<ResumeHook>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingResumeTrigger {
    /// Create a trigger that accepts every resume.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trigger that answers every resume with `CannotResume`.
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Run `hook` on every resume, before the outcome is decided.
    #[must_use]
    pub fn with_hook(mut self, hook: impl Fn(&DatabaseRecord) + Send + Sync + 'static) -> Self {
        self.hook = Some(std::sync::Arc::new(hook));
        self
    }

    /// Databases resumed so far, in order.
    #[must_use]
    pub fn resumed(&self) -> Vec<astra_admin_core::DatabaseId> {
        self.resumed.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl std::fmt::Debug for RecordingResumeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingResumeTrigger")
            .field("resumed", &self.resumed.lock().len())
            .field("refuse", &self.refuse)
            .finish_non_exhaustive()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl ResumeTrigger for RecordingResumeTrigger {
    async fn resume(&self, record: &DatabaseRecord) -> Result<()> {
        self.resumed.lock().push(record.id);
        if let Some(hook) = &self.hook {
            hook(record);
        }
        if self.refuse {
            return Err(ControlError::CannotResume(record.id));
        }
        Ok(())
    }
}
