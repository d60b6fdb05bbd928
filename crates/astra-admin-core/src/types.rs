//! Domain types describing databases managed by the control plane.
//!
//! These are transient snapshots: the control plane owns the authoritative
//! state and nothing here is cached across calls.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::DatabaseId;

/// A snapshot of a database as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    /// Identifier assigned by the control plane. Never changes.
    pub id: DatabaseId,
    /// Human-readable name. Not guaranteed unique.
    pub name: String,
    /// Current lifecycle status.
    pub status: DatabaseStatus,
    /// Cloud provider hosting the database.
    pub cloud_provider: CloudProvider,
    /// Primary region of the database.
    pub region: String,
    /// Workload kind; `None` for record types that are not databases of interest.
    #[serde(default)]
    pub workload_kind: Option<WorkloadKind>,
    /// Initial keyspace, when reported.
    #[serde(default)]
    pub keyspace: Option<String>,
    /// Creation timestamp, when reported.
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
}

/// Lifecycle status of a database.
///
/// Only the states the lifecycle orchestrator acts on are modeled. Every other
/// wire value is kept verbatim in [`DatabaseStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseStatus {
    /// Ready to serve traffic.
    Active,
    /// First-time provisioning in progress.
    Initializing,
    /// Queued for provisioning.
    Pending,
    /// Under maintenance, will return to active.
    Maintenance,
    /// Waking up from hibernation.
    Resuming,
    /// Suspended after inactivity; needs a resume nudge.
    Hibernated,
    /// Any state not modeled above (terminating, error, parked...).
    Other(String),
}

impl DatabaseStatus {
    /// Return the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Initializing => "INITIALIZING",
            Self::Pending => "PENDING",
            Self::Maintenance => "MAINTENANCE",
            Self::Resuming => "RESUMING",
            Self::Hibernated => "HIBERNATED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for DatabaseStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "INITIALIZING" => Self::Initializing,
            "PENDING" => Self::Pending,
            "MAINTENANCE" => Self::Maintenance,
            "RESUMING" => Self::Resuming,
            "HIBERNATED" => Self::Hibernated,
            _ => Self::Other(value),
        }
    }
}

impl From<DatabaseStatus> for String {
    fn from(status: DatabaseStatus) -> Self {
        match status {
            DatabaseStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloud provider hosting a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CloudProvider {
    /// Google Cloud Platform (free-tier default).
    #[default]
    Gcp,
    /// Amazon Web Services.
    Aws,
    /// Microsoft Azure.
    Azure,
}

impl CloudProvider {
    /// Return the wire representation of the provider.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gcp => "GCP",
            Self::Aws => "AWS",
            Self::Azure => "AZURE",
        }
    }
}

impl FromStr for CloudProvider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GCP" => Ok(Self::Gcp),
            "AWS" => Ok(Self::Aws),
            "AZURE" => Ok(Self::Azure),
            _ => Err(CoreError::UnknownCloudProvider(s.to_string())),
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of workload a database record was provisioned for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkloadKind {
    /// Vector-enabled serverless database.
    Vector,
    /// Any other reported kind.
    Other(String),
}

impl From<String> for WorkloadKind {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("vector") {
            Self::Vector
        } else {
            Self::Other(value)
        }
    }
}

impl From<WorkloadKind> for String {
    fn from(kind: WorkloadKind) -> Self {
        match kind {
            WorkloadKind::Vector => "vector".to_string(),
            WorkloadKind::Other(raw) => raw,
        }
    }
}
