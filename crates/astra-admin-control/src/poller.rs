//! Fixed-interval status polling.
//!
//! The poller re-reads a database until it reports `ACTIVE`, the activation
//! budget runs out, or the caller cancels. With interval `p` and budget `T`
//! it issues at most `ceil(T / p) + 1` status queries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use astra_admin_core::{DatabaseId, DatabaseRecord};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::devops_client::DevopsClient;
use crate::error::{ControlError, Result};
use crate::lifecycle;
use crate::types::AdminConfig;

/// Shortest interval the poller accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Run `fut` unless `cancel` fires first.
///
/// A token that is already cancelled wins without polling `fut`.
///
/// # Errors
///
/// Returns `ControlError::Cancelled` on cancellation, otherwise whatever
/// `fut` returns.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ControlError::Cancelled),
        result = fut => result,
    }
}

/// Polls a database's status until it becomes active.
#[derive(Clone)]
pub struct StatusPoller {
    devops: Arc<dyn DevopsClient>,
    interval: Duration,
    timeout: Duration,
}

impl StatusPoller {
    /// Create a poller with an explicit interval and budget.
    #[must_use]
    pub fn new(devops: Arc<dyn DevopsClient>, interval: Duration, timeout: Duration) -> Self {
        Self {
            devops,
            interval: interval.max(MIN_INTERVAL),
            timeout,
        }
    }

    /// Create a poller using the configured interval and budget.
    #[must_use]
    pub fn from_config(devops: Arc<dyn DevopsClient>, config: &AdminConfig) -> Self {
        Self::new(devops, config.poll_interval(), config.activation_timeout())
    }

    /// Delay between status checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Activation budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on status queries for one wait.
    #[must_use]
    pub fn max_queries(&self) -> u64 {
        let ratio = self.timeout.as_nanos().div_ceil(self.interval.as_nanos());
        u64::try_from(ratio).unwrap_or(u64::MAX).saturating_add(1)
    }

    /// Wait until `id` reports `ACTIVE` and return its record.
    ///
    /// # Errors
    ///
    /// - `ControlError::DatabaseNotFound` if the database disappears.
    /// - `ControlError::Timeout` if the budget runs out first.
    /// - `ControlError::Cancelled` if `cancel` fires.
    /// - Any error from the status query itself.
    pub async fn wait_until_active(
        &self,
        id: &DatabaseId,
        cancel: &CancellationToken,
    ) -> Result<DatabaseRecord> {
        let start = Instant::now();
        let mut attempts = 0u64;

        loop {
            attempts += 1;

            let record = cancellable(cancel, self.devops.find_by_id(id))
                .await?
                .ok_or_else(|| ControlError::DatabaseNotFound(id.to_string()))?;

            if lifecycle::is_active(&record.status) {
                tracing::info!(database_id = %id, attempts, "Database is active");
                return Ok(record);
            }

            let waited = start.elapsed();
            if waited >= self.timeout {
                tracing::warn!(
                    database_id = %id,
                    attempts,
                    status = %record.status,
                    "Database did not become active in time"
                );
                return Err(ControlError::Timeout {
                    database_id: *id,
                    waited,
                    last_status: record.status,
                });
            }

            tracing::debug!(
                database_id = %id,
                attempt = attempts,
                status = %record.status,
                delay_ms = self.interval.as_millis(),
                "Database not active yet, waiting"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!(database_id = %id, attempts, "Wait for database cancelled");
                    return Err(ControlError::Cancelled);
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops_client::MockDevopsClient;
    use astra_admin_core::{CloudProvider, DatabaseStatus, WorkloadKind};

    fn insert(mock: &MockDevopsClient, status: DatabaseStatus) -> DatabaseId {
        let id = DatabaseId::generate();
        mock.insert(DatabaseRecord {
            id,
            name: "alpha".to_string(),
            status,
            cloud_provider: CloudProvider::Gcp,
            region: "us-east1".to_string(),
            workload_kind: Some(WorkloadKind::Vector),
            keyspace: None,
            creation_time: None,
        });
        id
    }

    fn poller(mock: &Arc<MockDevopsClient>) -> StatusPoller {
        StatusPoller::from_config(mock.clone(), &AdminConfig::default())
    }

    #[test]
    fn default_budget_allows_37_queries() {
        let poller = poller(&Arc::new(MockDevopsClient::new()));
        assert_eq!(poller.interval(), Duration::from_secs(5));
        assert_eq!(poller.timeout(), Duration::from_secs(180));
        assert_eq!(poller.max_queries(), 37);

        let uneven = StatusPoller::new(
            Arc::new(MockDevopsClient::new()),
            Duration::from_secs(7),
            Duration::from_secs(20),
        );
        assert_eq!(uneven.max_queries(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_once_active() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Pending);
        mock.script_statuses(
            &id,
            [
                DatabaseStatus::Pending,
                DatabaseStatus::Pending,
                DatabaseStatus::Pending,
                DatabaseStatus::Active,
            ],
        );

        let start = Instant::now();
        let record = poller(&mock)
            .wait_until_active(&id, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(record.status, DatabaseStatus::Active);
        assert_eq!(mock.find_calls(), 4);
        // three 5s sleeps
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn active_database_needs_no_sleep() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Active);

        let start = Instant::now();
        poller(&mock)
            .wait_until_active(&id, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(mock.find_calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_within_query_bound() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Initializing);
        let poller = poller(&mock);

        let err = poller
            .wait_until_active(&id, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ControlError::Timeout {
                database_id,
                waited,
                last_status,
            } => {
                assert_eq!(database_id, id);
                assert!(waited >= Duration::from_secs(180));
                assert_eq!(last_status, DatabaseStatus::Initializing);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        let calls = u64::try_from(mock.find_calls()).unwrap();
        assert!(calls <= poller.max_queries());
        assert_eq!(calls, 37);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_queries_count_against_budget() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Pending);
        mock.set_find_latency(Duration::from_secs(5));
        let poller = poller(&mock);

        let result = poller
            .wait_until_active(&id, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ControlError::Timeout { .. })));
        assert!(u64::try_from(mock.find_calls()).unwrap() < poller.max_queries());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_database_is_not_found() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = DatabaseId::generate();

        let err = poller(&mock)
            .wait_until_active(&id, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::DatabaseNotFound(_)));
        assert_eq!(mock.find_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_sleep() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Pending);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = poller(&mock)
            .wait_until_active(&id, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::Cancelled));
        assert_eq!(mock.find_calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_skips_query() {
        let mock = Arc::new(MockDevopsClient::new());
        let id = insert(&mock, DatabaseStatus::Pending);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(&mock)
            .wait_until_active(&id, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::Cancelled));
        assert_eq!(mock.find_calls(), 0);
    }
}
