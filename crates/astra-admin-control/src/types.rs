//! Request and configuration types for lifecycle operations.

use std::time::Duration;

use astra_admin_core::{AstraEnvironment, CloudProvider, DatabaseId};
use serde::{Deserialize, Serialize};

/// Cloud provider used when none is requested (free tier).
pub const FREE_TIER_CLOUD: CloudProvider = CloudProvider::Gcp;

/// Region used when none is requested (free tier).
pub const FREE_TIER_REGION: &str = "us-east1";

/// Keyspace created with every new database.
pub const DEFAULT_KEYSPACE: &str = "default_keyspace";

/// Request to bring a database to the active state, creating it if needed.
///
/// Built per call and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleRequest {
    /// Database name.
    pub name: String,
    /// Cloud provider used if the database has to be created.
    #[serde(default)]
    pub cloud_provider: CloudProvider,
    /// Region used if the database has to be created.
    #[serde(default = "LifecycleRequest::default_region")]
    pub region: String,
    /// Keyspace created with a new database.
    #[serde(default = "LifecycleRequest::default_keyspace")]
    pub keyspace: String,
    /// Whether a new database gets vector capability.
    #[serde(default = "LifecycleRequest::default_true")]
    pub vector: bool,
    /// Block until the database is active.
    #[serde(default = "LifecycleRequest::default_true")]
    pub wait_for_active: bool,
}

impl LifecycleRequest {
    fn default_region() -> String {
        FREE_TIER_REGION.to_string()
    }

    fn default_keyspace() -> String {
        DEFAULT_KEYSPACE.to_string()
    }

    const fn default_true() -> bool {
        true
    }

    /// Create a request for the free-tier defaults, waiting for activation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cloud_provider: FREE_TIER_CLOUD,
            region: Self::default_region(),
            keyspace: Self::default_keyspace(),
            vector: true,
            wait_for_active: true,
        }
    }

    /// Set the cloud provider and region.
    #[must_use]
    pub fn in_region(mut self, cloud_provider: CloudProvider, region: impl Into<String>) -> Self {
        self.cloud_provider = cloud_provider;
        self.region = region.into();
        self
    }

    /// Set the initial keyspace.
    #[must_use]
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = keyspace.into();
        self
    }

    /// Set whether to block until the database is active.
    #[must_use]
    pub const fn wait(mut self, wait_for_active: bool) -> Self {
        self.wait_for_active = wait_for_active;
        self
    }
}

/// Body of a database creation call on the `DevOps` API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    /// Database name.
    pub name: String,
    /// Initial keyspace.
    pub keyspace: String,
    /// Cloud provider.
    pub cloud_provider: CloudProvider,
    /// Region.
    pub region: String,
    /// Service tier.
    pub tier: String,
    /// Capacity units.
    pub capacity_units: u32,
    /// Workload kind, `vector` when vector capability is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
}

impl From<&LifecycleRequest> for CreateDatabaseRequest {
    fn from(request: &LifecycleRequest) -> Self {
        Self {
            name: request.name.clone(),
            keyspace: request.keyspace.clone(),
            cloud_provider: request.cloud_provider,
            region: request.region.clone(),
            tier: "serverless".to_string(),
            capacity_units: 1,
            db_type: request.vector.then(|| "vector".to_string()),
        }
    }
}

/// Which generation of admin-client behavior to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientGeneration {
    /// Always block until the database is active.
    Legacy,
    /// Honor `LifecycleRequest::wait_for_active`.
    #[default]
    Current,
}

/// Configuration for the admin service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Target environment.
    #[serde(default)]
    pub environment: AstraEnvironment,

    /// Client behavior generation.
    #[serde(default)]
    pub generation: ClientGeneration,

    /// Override for the `DevOps` API base URL (tests, proxies).
    #[serde(default)]
    pub devops_url: Option<String>,

    /// Override for the per-database endpoint root, `{id}` and `{region}` substituted.
    #[serde(default)]
    pub database_url_template: Option<String>,

    /// Delay between activation status checks, in seconds.
    #[serde(default = "AdminConfig::default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Maximum time to wait for activation, in seconds.
    #[serde(default = "AdminConfig::default_activation_timeout")]
    pub activation_timeout_seconds: u64,

    /// Timeout for the resume probe, in seconds.
    #[serde(default = "AdminConfig::default_resume_timeout")]
    pub resume_timeout_seconds: u64,

    /// Timeout for `DevOps` API requests, in seconds.
    #[serde(default = "AdminConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connect timeout for all HTTP requests, in seconds.
    #[serde(default = "AdminConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Cloud provider for databases created by name only.
    #[serde(default)]
    pub default_cloud: CloudProvider,

    /// Region for databases created by name only.
    #[serde(default = "LifecycleRequest::default_region")]
    pub default_region: String,

    /// Keyspace for databases created by name only.
    #[serde(default = "LifecycleRequest::default_keyspace")]
    pub default_keyspace: String,
}

impl AdminConfig {
    const fn default_poll_interval() -> u64 {
        5
    }

    const fn default_activation_timeout() -> u64 {
        180 // 3 minutes
    }

    const fn default_resume_timeout() -> u64 {
        20
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        10
    }

    /// Delay between activation status checks.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Maximum time to wait for activation.
    #[must_use]
    pub fn activation_timeout(&self) -> Duration {
        Duration::from_secs(self.activation_timeout_seconds)
    }

    /// Timeout for the resume probe.
    #[must_use]
    pub fn resume_timeout(&self) -> Duration {
        Duration::from_secs(self.resume_timeout_seconds)
    }

    /// Timeout for `DevOps` API requests.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Connect timeout for all HTTP requests.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Base URL of the `DevOps` API, honoring the override.
    #[must_use]
    pub fn devops_base_url(&self) -> String {
        self.devops_url
            .clone()
            .unwrap_or_else(|| self.environment.devops_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Root URL of a database's own endpoints, honoring the template override.
    #[must_use]
    pub fn database_url(&self, id: &DatabaseId, region: &str) -> String {
        match &self.database_url_template {
            Some(template) => template
                .replace("{id}", &id.to_string())
                .replace("{region}", region)
                .trim_end_matches('/')
                .to_string(),
            None => self.environment.database_url(id, region),
        }
    }

    /// Data API endpoint of a database.
    #[must_use]
    pub fn data_api_endpoint(&self, id: &DatabaseId, region: &str) -> String {
        format!("{}/api/json", self.database_url(id, region))
    }

    /// Lifecycle request for `name` using the configured placement defaults.
    #[must_use]
    pub fn lifecycle_request(&self, name: impl Into<String>) -> LifecycleRequest {
        LifecycleRequest::new(name)
            .in_region(self.default_cloud, self.default_region.clone())
            .with_keyspace(self.default_keyspace.clone())
    }

    /// Keyspace listing endpoint of the REST API, used to wake a hibernated database.
    #[must_use]
    pub fn resume_endpoint(&self, id: &DatabaseId, region: &str) -> String {
        format!("{}/api/rest/v2/schemas/keyspace", self.database_url(id, region))
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            environment: AstraEnvironment::default(),
            generation: ClientGeneration::default(),
            devops_url: None,
            database_url_template: None,
            poll_interval_seconds: Self::default_poll_interval(),
            activation_timeout_seconds: Self::default_activation_timeout(),
            resume_timeout_seconds: Self::default_resume_timeout(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            default_cloud: FREE_TIER_CLOUD,
            default_region: LifecycleRequest::default_region(),
            default_keyspace: LifecycleRequest::default_keyspace(),
        }
    }
}
