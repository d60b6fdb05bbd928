//! Target environments and the endpoints derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::DatabaseId;

/// The Astra environment an admin client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AstraEnvironment {
    /// Production.
    #[default]
    Prod,
    /// Development.
    Dev,
    /// Test.
    Test,
}

impl AstraEnvironment {
    /// Base URL of the `DevOps` API for this environment.
    #[must_use]
    pub const fn devops_url(&self) -> &'static str {
        match self {
            Self::Prod => "https://api.astra.datastax.com/v2",
            Self::Dev => "https://api.dev.cloud.datastax.com/v2",
            Self::Test => "https://api.test.cloud.datastax.com/v2",
        }
    }

    /// Domain under which per-database endpoints are served.
    #[must_use]
    pub const fn apps_domain(&self) -> &'static str {
        match self {
            Self::Prod => "apps.astra.datastax.com",
            Self::Dev => "apps.astra-dev.datastax.com",
            Self::Test => "apps.astra-test.datastax.com",
        }
    }

    /// Root URL of a database's own endpoints (`https://{id}-{region}.{domain}`).
    #[must_use]
    pub fn database_url(&self, id: &DatabaseId, region: &str) -> String {
        format!("https://{id}-{region}.{}", self.apps_domain())
    }
}

impl FromStr for AstraEnvironment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Self::Prod),
            "dev" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            _ => Err(CoreError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for AstraEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prod => "prod",
            Self::Dev => "dev",
            Self::Test => "test",
        };
        f.write_str(name)
    }
}
