//! HTTP client for the Astra `DevOps` API.
//!
//! This module provides the `DevopsClient` seam the orchestrator talks to,
//! its HTTP implementation, and an in-memory fake for tests.

use astra_admin_auth::Token;
use astra_admin_core::{CloudProvider, DatabaseId, DatabaseRecord, DatabaseStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{ControlError, Result};
use crate::lifecycle;
use crate::types::{AdminConfig, CreateDatabaseRequest};

/// Maximum number of records requested per listing.
const LIST_LIMIT: u32 = 1000;

/// Trait for control-plane communication.
///
/// This trait abstracts the `DevOps` API, allowing for fake implementations
/// in tests.
#[async_trait]
pub trait DevopsClient: Send + Sync {
    /// List every database that is not terminated, in the control plane's order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    async fn list_non_terminated(&self) -> Result<Vec<DatabaseRecord>>;

    /// Find a database by identifier.
    ///
    /// Returns `None` if it does not exist or is terminating.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn find_by_id(&self, id: &DatabaseId) -> Result<Option<DatabaseRecord>>;

    /// Create a database and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the control plane rejects the request.
    async fn create(&self, request: &CreateDatabaseRequest) -> Result<DatabaseId>;

    /// Terminate a database.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DatabaseNotFound` if it does not exist.
    async fn terminate(&self, id: &DatabaseId) -> Result<()>;
}

/// HTTP client for the `DevOps` API.
#[derive(Debug, Clone)]
pub struct HttpDevopsClient {
    client: reqwest::Client,
    base_url: String,
    token: Token,
}

impl HttpDevopsClient {
    /// Create a client from the admin configuration.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig, token: Token) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, config.devops_base_url(), token))
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, token: Token) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL of the `DevOps` API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&self.token.bearer())
            .map_err(|_| ControlError::Auth(astra_admin_auth::AuthError::InvalidToken))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn database_url(&self, id: &DatabaseId) -> String {
        format!("{}/databases/{id}", self.base_url)
    }
}

/// Database record as returned by the `DevOps` API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatabase {
    id: String,
    status: DatabaseStatus,
    #[serde(default)]
    creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    info: RawDatabaseInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatabaseInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    keyspace: Option<String>,
    #[serde(default)]
    cloud_provider: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    db_type: Option<String>,
}

impl TryFrom<RawDatabase> for DatabaseRecord {
    type Error = ControlError;

    fn try_from(raw: RawDatabase) -> Result<Self> {
        let id: DatabaseId = raw
            .id
            .parse()
            .map_err(|_| ControlError::InvalidResponse(format!("invalid database id {:?}", raw.id)))?;

        let cloud_provider = match raw.info.cloud_provider.as_deref() {
            Some(provider) => provider.parse::<CloudProvider>().map_err(|e| {
                ControlError::InvalidResponse(format!("database {id}: {e}"))
            })?,
            None => CloudProvider::default(),
        };

        Ok(Self {
            id,
            name: raw.info.name.unwrap_or_default(),
            status: raw.status,
            cloud_provider,
            region: raw.info.region.unwrap_or_default(),
            workload_kind: raw.info.db_type.map(Into::into),
            keyspace: raw.info.keyspace,
            creation_time: raw.creation_time,
        })
    }
}

/// Error body returned by the `DevOps` API.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Turn a non-success response into a `ControlError::Api`.
async fn api_error(response: reqwest::Response) -> ControlError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.errors.into_iter().find_map(|e| e.description))
        .unwrap_or_else(|| format!("DevOps API returned status {status}"));

    ControlError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Extract the new database id from a creation response.
///
/// The id is the last path segment of the `Location` header; some
/// environments return it in the body instead.
async fn created_id(response: reqwest::Response) -> Result<DatabaseId> {
    let from_location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
        .map(str::to_string);

    let raw = match from_location {
        Some(segment) => segment,
        None => {
            response
                .json::<CreatedResponse>()
                .await
                .map_err(|e| {
                    ControlError::InvalidResponse(format!("no database id in creation response: {e}"))
                })?
                .id
        }
    };

    raw.parse()
        .map_err(|_| ControlError::InvalidResponse(format!("invalid database id {raw:?}")))
}

#[async_trait]
impl DevopsClient for HttpDevopsClient {
    async fn list_non_terminated(&self) -> Result<Vec<DatabaseRecord>> {
        let url = format!("{}/databases", self.base_url);
        let limit = LIST_LIMIT.to_string();

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[
                ("include", "nonterminated"),
                ("provider", "ALL"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let raw: Vec<RawDatabase> = response
            .json()
            .await
            .map_err(|e| ControlError::InvalidResponse(format!("failed to parse listing: {e}")))?;

        // All or nothing: a shortened listing hides existing names.
        let records = raw
            .into_iter()
            .map(DatabaseRecord::try_from)
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| tracing::warn!(error = %e, "Unreadable database record in listing"))?;

        tracing::debug!(count = records.len(), "Listed non-terminated databases");
        Ok(records)
    }

    async fn find_by_id(&self, id: &DatabaseId) -> Result<Option<DatabaseRecord>> {
        let response = self
            .client
            .get(self.database_url(id))
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let raw: RawDatabase = response
            .json()
            .await
            .map_err(|e| ControlError::InvalidResponse(format!("failed to parse database: {e}")))?;
        let record = DatabaseRecord::try_from(raw)?;

        if lifecycle::is_terminated(&record.status) {
            tracing::debug!(database_id = %id, status = %record.status, "Database is terminating");
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn create(&self, request: &CreateDatabaseRequest) -> Result<DatabaseId> {
        let url = format!("{}/databases", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            tracing::error!(name = %request.name, error = %err, "Failed to create database");
            return Err(err);
        }

        let id = created_id(response).await?;
        tracing::debug!(database_id = %id, name = %request.name, "Created database via DevOps API");
        Ok(id)
    }

    async fn terminate(&self, id: &DatabaseId) -> Result<()> {
        let url = format!("{}/terminate", self.database_url(id));

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ControlError::DatabaseNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            let err = api_error(response).await;
            tracing::error!(database_id = %id, error = %err, "Failed to terminate database");
            return Err(err);
        }

        tracing::debug!(database_id = %id, "Terminated database via DevOps API");
        Ok(())
    }
}

/// In-memory control plane for tests.
///
/// Records are kept in insertion order, which is the listing order. Status
/// scripts let a test dictate what successive `find_by_id` calls observe.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockDevopsClient {
    state: parking_lot::Mutex<MockState>,
}

#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
struct MockState {
    records: Vec<DatabaseRecord>,
    scripts: std::collections::HashMap<DatabaseId, std::collections::VecDeque<DatabaseStatus>>,
    created_status: Option<DatabaseStatus>,
    created_script: Vec<DatabaseStatus>,
    created: Vec<CreateDatabaseRequest>,
    list_calls: usize,
    find_calls: usize,
    terminate_calls: usize,
    find_latency: Option<std::time::Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockDevopsClient {
    /// Create an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; listing order follows insertion order.
    pub fn insert(&self, record: DatabaseRecord) {
        self.state.lock().records.push(record);
    }

    /// Queue statuses returned by successive `find_by_id` calls for `id`.
    ///
    /// Once the script is exhausted the last status sticks.
    pub fn script_statuses(&self, id: &DatabaseId, statuses: impl IntoIterator<Item = DatabaseStatus>) {
        self.state
            .lock()
            .scripts
            .entry(*id)
            .or_default()
            .extend(statuses);
    }

    /// Status given to databases created through the fake (default `PENDING`).
    pub fn set_created_status(&self, status: DatabaseStatus) {
        self.state.lock().created_status = Some(status);
    }

    /// Script applied to every database created through the fake.
    pub fn script_created_statuses(&self, statuses: impl IntoIterator<Item = DatabaseStatus>) {
        self.state.lock().created_script = statuses.into_iter().collect();
    }

    /// Delay every `find_by_id` call by `latency`.
    pub fn set_find_latency(&self, latency: std::time::Duration) {
        self.state.lock().find_latency = Some(latency);
    }

    /// Requests received by `create`, in order.
    #[must_use]
    pub fn created_requests(&self) -> Vec<CreateDatabaseRequest> {
        self.state.lock().created.clone()
    }

    /// Number of `list_non_terminated` calls.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Number of `find_by_id` calls.
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.state.lock().find_calls
    }

    /// Number of successful `terminate` calls.
    #[must_use]
    pub fn terminate_calls(&self) -> usize {
        self.state.lock().terminate_calls
    }

    /// Current snapshot of a record.
    #[must_use]
    pub fn record(&self, id: &DatabaseId) -> Option<DatabaseRecord> {
        self.state.lock().records.iter().find(|r| r.id == *id).cloned()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl DevopsClient for MockDevopsClient {
    async fn list_non_terminated(&self) -> Result<Vec<DatabaseRecord>> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        Ok(state.records.clone())
    }

    async fn find_by_id(&self, id: &DatabaseId) -> Result<Option<DatabaseRecord>> {
        let latency = {
            let mut state = self.state.lock();
            state.find_calls += 1;
            state.find_latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        let next = state.scripts.get_mut(id).and_then(|script| {
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        });

        let record = state.records.iter_mut().find(|r| r.id == *id);
        Ok(record.and_then(|record| {
            if let Some(status) = next {
                record.status = status;
            }
            (!lifecycle::is_terminated(&record.status)).then(|| record.clone())
        }))
    }

    async fn create(&self, request: &CreateDatabaseRequest) -> Result<DatabaseId> {
        let mut state = self.state.lock();
        let id = DatabaseId::generate();
        let status = state
            .created_status
            .clone()
            .unwrap_or(DatabaseStatus::Pending);

        state.records.push(DatabaseRecord {
            id,
            name: request.name.clone(),
            status,
            cloud_provider: request.cloud_provider,
            region: request.region.clone(),
            workload_kind: request.db_type.clone().map(Into::into),
            keyspace: Some(request.keyspace.clone()),
            creation_time: Some(Utc::now()),
        });
        if !state.created_script.is_empty() {
            let script = state.created_script.iter().cloned().collect();
            state.scripts.insert(id, script);
        }
        state.created.push(request.clone());
        Ok(id)
    }

    async fn terminate(&self, id: &DatabaseId) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.records.len();
        state.records.retain(|r| r.id != *id);
        if state.records.len() == before {
            return Err(ControlError::DatabaseNotFound(id.to_string()));
        }
        state.terminate_calls += 1;
        Ok(())
    }
}
