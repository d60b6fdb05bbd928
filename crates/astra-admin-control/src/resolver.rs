//! Name-based lookup over the non-terminated database listing.
//!
//! Names are not unique on the control plane. Every lookup here walks the
//! listing in the order the control plane returned it and takes the first
//! match.

use std::sync::Arc;

use astra_admin_core::{DatabaseId, DatabaseRecord};

use crate::devops_client::DevopsClient;
use crate::error::Result;
use crate::lifecycle;

/// Resolves database names to records.
#[derive(Clone)]
pub struct DatabaseResolver {
    devops: Arc<dyn DevopsClient>,
}

impl DatabaseResolver {
    /// Create a resolver over a control-plane client.
    #[must_use]
    pub fn new(devops: Arc<dyn DevopsClient>) -> Self {
        Self { devops }
    }

    /// List databases that can carry vector workloads, in listing order.
    ///
    /// Records with no workload kind at all predate the current database
    /// type and are skipped. Records that are terminating or terminated
    /// count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn list_active(&self) -> Result<Vec<DatabaseRecord>> {
        let records = self.devops.list_non_terminated().await?;
        let total = records.len();

        let usable: Vec<_> = records
            .into_iter()
            .filter(|r| r.workload_kind.is_some())
            .filter(|r| !lifecycle::is_terminated(&r.status))
            .collect();

        tracing::debug!(total, usable = usable.len(), "Resolved database listing");
        Ok(usable)
    }

    /// Names of all usable databases, in listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect())
    }

    /// Find the first database called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<DatabaseRecord>> {
        let found = self
            .list_active()
            .await?
            .into_iter()
            .find(|r| r.name == name);

        if let Some(record) = &found {
            tracing::debug!(name, database_id = %record.id, status = %record.status, "Found database by name");
        }
        Ok(found)
    }

    /// Returns true if a database called `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.find_by_name(name).await?.is_some())
    }

    /// Returns true if a database with this identifier exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn exists_by_id(&self, id: &DatabaseId) -> Result<bool> {
        Ok(self.devops.find_by_id(id).await?.is_some())
    }
}

impl std::fmt::Debug for DatabaseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseResolver").finish_non_exhaustive()
    }
}
