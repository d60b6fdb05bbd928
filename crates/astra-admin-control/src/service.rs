//! Admin service implementation.
//!
//! This module provides the `DatabaseAdmin` trait and the `AdminService`
//! implementation that drives a database to the active state and tears it
//! down again.

use std::sync::Arc;

use astra_admin_auth::Token;
use astra_admin_core::{DatabaseId, DatabaseRecord};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::devops_client::{DevopsClient, HttpDevopsClient};
use crate::error::{ControlError, Result};
use crate::lifecycle::{self, ActivationPlan};
use crate::poller::{cancellable, StatusPoller};
use crate::resolver::DatabaseResolver;
use crate::resume::{HttpResumeTrigger, ResumeTrigger};
use crate::types::{AdminConfig, ClientGeneration, CreateDatabaseRequest, LifecycleRequest};

/// Trait defining the database administration operations.
#[async_trait]
pub trait DatabaseAdmin: Send + Sync {
    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Make sure a database called `request.name` exists and is active.
    ///
    /// Creates it when absent, resumes it when hibernated, and waits for
    /// activation unless the request opts out.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Validation` before any network call if the
    /// request is malformed, `ControlError::IllegalState` if the database
    /// cannot be activated, `ControlError::CannotResume` if the account
    /// refuses the resume, and `ControlError::Timeout` if activation takes
    /// too long.
    async fn ensure_active(
        &self,
        request: &LifecycleRequest,
        cancel: &CancellationToken,
    ) -> Result<DatabaseId>;

    /// `ensure_active` with the configured placement defaults.
    async fn create_database(&self, name: &str, cancel: &CancellationToken) -> Result<DatabaseId>;

    /// Terminate a database by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DatabaseNotFound` if it does not exist, which
    /// includes a second drop of the same database.
    async fn drop_database(&self, id: &DatabaseId, cancel: &CancellationToken) -> Result<bool>;

    /// Terminate the first database called `name`.
    ///
    /// Returns `false` when no database has that name.
    async fn drop_database_by_name(&self, name: &str, cancel: &CancellationToken) -> Result<bool>;

    // =========================================================================
    // Queries
    // =========================================================================

    /// Usable databases in listing order.
    async fn list_databases(&self) -> Result<Vec<DatabaseRecord>>;

    /// Names of usable databases in listing order.
    async fn list_names(&self) -> Result<Vec<String>>;

    /// Returns true if a database called `name` exists.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Returns true if a database with this identifier exists.
    async fn exists_by_id(&self, id: &DatabaseId) -> Result<bool>;

    /// Fetch a database by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DatabaseNotFound` if it does not exist.
    async fn get_database_info(&self, id: &DatabaseId) -> Result<DatabaseRecord>;

    /// Data API endpoint of a database.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DatabaseNotFound` if it does not exist.
    async fn api_endpoint(&self, id: &DatabaseId) -> Result<String>;
}

/// The main admin service implementation.
#[derive(Clone)]
pub struct AdminService {
    devops: Arc<dyn DevopsClient>,
    resume: Arc<dyn ResumeTrigger>,
    resolver: DatabaseResolver,
    poller: StatusPoller,
    config: AdminConfig,
}

impl AdminService {
    /// Create a service over the given seams.
    #[must_use]
    pub fn new(
        devops: Arc<dyn DevopsClient>,
        resume: Arc<dyn ResumeTrigger>,
        config: AdminConfig,
    ) -> Self {
        let resolver = DatabaseResolver::new(devops.clone());
        let poller = StatusPoller::from_config(devops.clone(), &config);
        Self {
            devops,
            resume,
            resolver,
            poller,
            config,
        }
    }

    /// Create a service talking HTTP to the configured environment.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Transport` if an HTTP client cannot be built.
    pub fn connect(config: AdminConfig, token: Token) -> Result<Self> {
        let devops = HttpDevopsClient::new(&config, token.clone())?;
        let resume = HttpResumeTrigger::new(&config, token)?;

        tracing::debug!(
            environment = %config.environment,
            generation = ?config.generation,
            devops_url = %devops.base_url(),
            "Admin service connected"
        );

        Ok(Self::new(Arc::new(devops), Arc::new(resume), config))
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AdminConfig {
        &self.config
    }

    fn validate(request: &LifecycleRequest) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(ControlError::Validation(
                "database name must not be empty".to_string(),
            ));
        }
        if request.region.trim().is_empty() {
            return Err(ControlError::Validation(
                "region must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Legacy clients always block; current ones honor the request.
    const fn should_wait(&self, request: &LifecycleRequest) -> bool {
        match self.config.generation {
            ClientGeneration::Legacy => true,
            ClientGeneration::Current => request.wait_for_active,
        }
    }

    async fn settle(
        &self,
        id: &DatabaseId,
        request: &LifecycleRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if self.should_wait(request) {
            self.poller.wait_until_active(id, cancel).await?;
        } else {
            tracing::debug!(database_id = %id, "Not waiting for activation");
        }
        Ok(())
    }

    async fn create_and_settle(
        &self,
        request: &LifecycleRequest,
        cancel: &CancellationToken,
    ) -> Result<DatabaseId> {
        tracing::info!(
            name = %request.name,
            cloud_provider = %request.cloud_provider,
            region = %request.region,
            "Creating database"
        );

        let body = CreateDatabaseRequest::from(request);
        let id = cancellable(cancel, self.devops.create(&body)).await?;

        tracing::info!(database_id = %id, name = %request.name, "Database creation accepted");
        self.settle(&id, request, cancel).await?;
        Ok(id)
    }
}

impl std::fmt::Debug for AdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminService")
            .field("config", &self.config)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseAdmin for AdminService {
    async fn ensure_active(
        &self,
        request: &LifecycleRequest,
        cancel: &CancellationToken,
    ) -> Result<DatabaseId> {
        Self::validate(request)?;

        let Some(record) = cancellable(cancel, self.resolver.find_by_name(&request.name)).await?
        else {
            return self.create_and_settle(request, cancel).await;
        };

        match lifecycle::plan_activation(&record.id, &record.status)? {
            ActivationPlan::Ready => {
                tracing::info!(database_id = %record.id, name = %record.name, "Database already active");
            }
            ActivationPlan::AwaitTransition => {
                tracing::info!(
                    database_id = %record.id,
                    status = %record.status,
                    "Database is transitioning"
                );
                self.settle(&record.id, request, cancel).await?;
            }
            ActivationPlan::Resume => {
                cancellable(cancel, self.resume.resume(&record)).await?;
                self.settle(&record.id, request, cancel).await?;
            }
        }

        Ok(record.id)
    }

    async fn create_database(&self, name: &str, cancel: &CancellationToken) -> Result<DatabaseId> {
        let request = self.config.lifecycle_request(name);
        self.ensure_active(&request, cancel).await
    }

    async fn drop_database(&self, id: &DatabaseId, cancel: &CancellationToken) -> Result<bool> {
        let record = cancellable(cancel, self.devops.find_by_id(id))
            .await?
            .ok_or_else(|| ControlError::DatabaseNotFound(id.to_string()))?;

        cancellable(cancel, self.devops.terminate(&record.id)).await?;

        tracing::info!(database_id = %record.id, name = %record.name, "Database terminated");
        Ok(true)
    }

    async fn drop_database_by_name(&self, name: &str, cancel: &CancellationToken) -> Result<bool> {
        let Some(record) = cancellable(cancel, self.resolver.find_by_name(name)).await? else {
            tracing::info!(name, "No database to drop");
            return Ok(false);
        };

        cancellable(cancel, self.devops.terminate(&record.id)).await?;

        tracing::info!(database_id = %record.id, name, "Database terminated");
        Ok(true)
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseRecord>> {
        self.resolver.list_active().await
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        self.resolver.list_names().await
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        self.resolver.exists(name).await
    }

    async fn exists_by_id(&self, id: &DatabaseId) -> Result<bool> {
        self.resolver.exists_by_id(id).await
    }

    async fn get_database_info(&self, id: &DatabaseId) -> Result<DatabaseRecord> {
        self.devops
            .find_by_id(id)
            .await?
            .ok_or_else(|| ControlError::DatabaseNotFound(id.to_string()))
    }

    async fn api_endpoint(&self, id: &DatabaseId) -> Result<String> {
        let record = self.get_database_info(id).await?;
        Ok(self.config.data_api_endpoint(&record.id, &record.region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops_client::MockDevopsClient;
    use crate::resume::RecordingResumeTrigger;
    use astra_admin_core::{CloudProvider, DatabaseStatus, WorkloadKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn record(name: &str, status: DatabaseStatus) -> DatabaseRecord {
        DatabaseRecord {
            id: DatabaseId::generate(),
            name: name.to_string(),
            status,
            cloud_provider: CloudProvider::Gcp,
            region: "us-east1".to_string(),
            workload_kind: Some(WorkloadKind::Vector),
            keyspace: Some("default_keyspace".to_string()),
            creation_time: None,
        }
    }

    fn service_with(
        devops: &Arc<MockDevopsClient>,
        resume: &Arc<RecordingResumeTrigger>,
        config: AdminConfig,
    ) -> AdminService {
        AdminService::new(devops.clone(), resume.clone(), config)
    }

    fn setup() -> (Arc<MockDevopsClient>, Arc<RecordingResumeTrigger>, AdminService) {
        let devops = Arc::new(MockDevopsClient::new());
        let resume = Arc::new(RecordingResumeTrigger::new());
        let service = service_with(&devops, &resume, AdminConfig::default());
        (devops, resume, service)
    }

    #[test]
    fn http_service_creation() {
        let token = Token::new("AstraCS:test-token").unwrap();
        let service = AdminService::connect(AdminConfig::default(), token).unwrap();
        assert_eq!(service.config().generation, ClientGeneration::Current);
    }

    #[tokio::test]
    async fn active_database_is_idempotent() {
        let (devops, resume, service) = setup();
        let alpha = record("alpha", DatabaseStatus::Active);
        devops.insert(alpha.clone());
        let cancel = CancellationToken::new();
        let request = LifecycleRequest::new("alpha");

        for _ in 0..3 {
            let id = service.ensure_active(&request, &cancel).await.unwrap();
            assert_eq!(id, alpha.id);
        }

        assert!(devops.created_requests().is_empty());
        assert_eq!(devops.find_calls(), 0);
        assert_eq!(devops.list_calls(), 3);
        assert!(resume.resumed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn absent_database_is_created_and_awaited() {
        let (devops, _resume, service) = setup();
        devops.script_created_statuses([
            DatabaseStatus::Pending,
            DatabaseStatus::Pending,
            DatabaseStatus::Pending,
            DatabaseStatus::Active,
        ]);

        let start = Instant::now();
        let id = service
            .ensure_active(&LifecycleRequest::new("alpha"), &CancellationToken::new())
            .await
            .unwrap();

        let created = devops.created_requests();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "alpha");
        assert_eq!(created[0].cloud_provider, CloudProvider::Gcp);
        assert_eq!(created[0].region, "us-east1");
        assert_eq!(created[0].db_type.as_deref(), Some("vector"));

        assert_eq!(devops.record(&id).unwrap().status, DatabaseStatus::Active);
        assert_eq!(devops.find_calls(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn hibernated_database_is_resumed_before_polling() {
        let devops = Arc::new(MockDevopsClient::new());
        let finds_at_resume = Arc::new(AtomicUsize::new(usize::MAX));
        let resume = {
            let devops = devops.clone();
            let finds_at_resume = finds_at_resume.clone();
            Arc::new(RecordingResumeTrigger::new().with_hook(move |_| {
                finds_at_resume.store(devops.find_calls(), Ordering::SeqCst);
            }))
        };
        let service = service_with(&devops, &resume, AdminConfig::default());

        let beta = record("beta", DatabaseStatus::Hibernated);
        devops.insert(beta.clone());
        devops.script_statuses(&beta.id, [DatabaseStatus::Resuming, DatabaseStatus::Active]);

        let id = service
            .ensure_active(&LifecycleRequest::new("beta"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, beta.id);
        assert_eq!(resume.resumed(), vec![beta.id]);
        assert_eq!(finds_at_resume.load(Ordering::SeqCst), 0);
        assert_eq!(devops.find_calls(), 2);
        assert!(devops.created_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_resume_never_polls() {
        let devops = Arc::new(MockDevopsClient::new());
        let resume = Arc::new(RecordingResumeTrigger::refusing());
        let service = service_with(&devops, &resume, AdminConfig::default());
        let beta = record("beta", DatabaseStatus::Hibernated);
        devops.insert(beta.clone());

        let err = service
            .ensure_active(&LifecycleRequest::new("beta"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::CannotResume(id) if id == beta.id));
        assert_eq!(resume.resumed().len(), 1);
        assert_eq!(devops.find_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transitional_database_is_awaited_not_created() {
        let (devops, resume, service) = setup();
        let gamma = record("gamma", DatabaseStatus::Maintenance);
        devops.insert(gamma.clone());
        devops.script_statuses(&gamma.id, [DatabaseStatus::Maintenance, DatabaseStatus::Active]);

        let id = service
            .ensure_active(&LifecycleRequest::new("gamma"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, gamma.id);
        assert_eq!(devops.find_calls(), 2);
        assert!(devops.created_requests().is_empty());
        assert!(resume.resumed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transitional_database_without_wait_returns_at_once() {
        let (devops, resume, service) = setup();
        let gamma = record("gamma", DatabaseStatus::Initializing);
        devops.insert(gamma.clone());

        let start = Instant::now();
        let id = service
            .ensure_active(&LifecycleRequest::new("gamma").wait(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, gamma.id);
        assert_eq!(devops.find_calls(), 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(devops.created_requests().is_empty());
        assert!(resume.resumed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hibernated_database_without_wait_is_resumed_once() {
        let (devops, resume, service) = setup();
        let beta = record("beta", DatabaseStatus::Hibernated);
        devops.insert(beta.clone());

        let id = service
            .ensure_active(&LifecycleRequest::new("beta").wait(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, beta.id);
        assert_eq!(resume.resumed(), vec![beta.id]);
        assert_eq!(devops.find_calls(), 0);
        assert!(devops.created_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn activation_timeout_reaches_the_caller() {
        let (devops, _resume, service) = setup();
        let gamma = record("gamma", DatabaseStatus::Pending);
        devops.insert(gamma.clone());

        let start = Instant::now();
        let err = service
            .ensure_active(&LifecycleRequest::new("gamma"), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ControlError::Timeout {
                database_id,
                waited,
                last_status,
            } => {
                assert_eq!(database_id, gamma.id);
                assert_eq!(waited, Duration::from_secs(180));
                assert_eq!(last_status, DatabaseStatus::Pending);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(start.elapsed(), Duration::from_secs(180));
        assert!(devops.created_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_database_reaches_the_caller() {
        let (devops, _resume, service) = setup();
        let gamma = record("gamma", DatabaseStatus::Pending);
        devops.insert(gamma.clone());
        devops.script_statuses(&gamma.id, [DatabaseStatus::Other("TERMINATED".into())]);

        let err = service
            .ensure_active(&LifecycleRequest::new("gamma"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(&err, ControlError::DatabaseNotFound(id) if *id == gamma.id.to_string()), "{err:?}");
        assert_eq!(devops.find_calls(), 1);
        assert!(devops.created_requests().is_empty());
    }

    #[tokio::test]
    async fn terminating_namesake_is_replaced() {
        let (devops, _resume, service) = setup();
        let old = record("alpha", DatabaseStatus::Other("TERMINATING".into()));
        devops.insert(old.clone());

        let id = service
            .ensure_active(&LifecycleRequest::new("alpha").wait(false), &CancellationToken::new())
            .await
            .unwrap();

        assert_ne!(id, old.id);
        assert_eq!(devops.created_requests().len(), 1);
    }

    #[tokio::test]
    async fn unreadable_listing_never_creates() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/databases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": DatabaseId::generate().to_string(),
                "status": "ACTIVE",
                "info": { "name": "alpha", "cloudProvider": "IBM", "region": "us-south", "dbType": "vector" }
            }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/databases"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let devops = crate::devops_client::HttpDevopsClient::with_client(
            reqwest::Client::new(),
            format!("{}/v2", server.uri()),
            Token::new("AstraCS:test-token").unwrap(),
        );
        let service = AdminService::new(
            Arc::new(devops),
            Arc::new(RecordingResumeTrigger::new()),
            AdminConfig::default(),
        );

        let err = service
            .ensure_active(&LifecycleRequest::new("alpha"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::InvalidResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unmodeled_status_is_illegal() {
        let (devops, resume, service) = setup();
        devops.insert(record("delta", DatabaseStatus::Other("ERROR".into())));

        let err = service
            .ensure_active(&LifecycleRequest::new("delta"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::IllegalState { .. }));
        assert!(devops.created_requests().is_empty());
        assert_eq!(devops.find_calls(), 0);
        assert!(resume.resumed().is_empty());
    }

    #[tokio::test]
    async fn invalid_requests_make_no_calls() {
        let (devops, _resume, service) = setup();
        let cancel = CancellationToken::new();

        let err = service
            .ensure_active(&LifecycleRequest::new("  "), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::Validation(_)));

        let no_region = LifecycleRequest::new("alpha").in_region(CloudProvider::Aws, "");
        let err = service.ensure_active(&no_region, &cancel).await.unwrap_err();
        assert!(matches!(err, ControlError::Validation(_)));

        assert_eq!(devops.list_calls(), 0);
        assert!(devops.created_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn current_generation_honors_no_wait() {
        let (devops, _resume, service) = setup();

        service
            .ensure_active(
                &LifecycleRequest::new("alpha").wait(false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(devops.created_requests().len(), 1);
        assert_eq!(devops.find_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn legacy_generation_always_waits() {
        let devops = Arc::new(MockDevopsClient::new());
        let resume = Arc::new(RecordingResumeTrigger::new());
        let config = AdminConfig {
            generation: ClientGeneration::Legacy,
            ..AdminConfig::default()
        };
        let service = service_with(&devops, &resume, config);
        devops.script_created_statuses([DatabaseStatus::Initializing, DatabaseStatus::Active]);

        service
            .ensure_active(
                &LifecycleRequest::new("alpha").wait(false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(devops.find_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn create_database_uses_configured_placement() {
        let devops = Arc::new(MockDevopsClient::new());
        let resume = Arc::new(RecordingResumeTrigger::new());
        let config = AdminConfig {
            default_cloud: CloudProvider::Azure,
            default_region: "westus3".to_string(),
            ..AdminConfig::default()
        };
        let service = service_with(&devops, &resume, config);
        devops.set_created_status(DatabaseStatus::Active);

        service
            .create_database("epsilon", &CancellationToken::new())
            .await
            .unwrap();

        let created = devops.created_requests();
        assert_eq!(created[0].cloud_provider, CloudProvider::Azure);
        assert_eq!(created[0].region, "westus3");
        assert_eq!(created[0].keyspace, "default_keyspace");
    }

    #[tokio::test]
    async fn drop_succeeds_once() {
        let (devops, _resume, service) = setup();
        let alpha = record("alpha", DatabaseStatus::Active);
        devops.insert(alpha.clone());
        let cancel = CancellationToken::new();

        assert!(service.drop_database(&alpha.id, &cancel).await.unwrap());
        let err = service.drop_database(&alpha.id, &cancel).await.unwrap_err();

        assert!(matches!(err, ControlError::DatabaseNotFound(_)));
        assert_eq!(devops.terminate_calls(), 1);
    }

    #[tokio::test]
    async fn drop_by_name_reports_absence() {
        let (devops, _resume, service) = setup();
        let first = record("alpha", DatabaseStatus::Active);
        let second = record("alpha", DatabaseStatus::Active);
        devops.insert(first.clone());
        devops.insert(second.clone());
        let cancel = CancellationToken::new();

        assert!(!service.drop_database_by_name("nope", &cancel).await.unwrap());
        assert!(service.drop_database_by_name("alpha", &cancel).await.unwrap());

        assert!(devops.record(&first.id).is_none());
        assert!(devops.record(&second.id).is_some());
    }

    #[tokio::test]
    async fn info_and_endpoint() {
        let (devops, _resume, service) = setup();
        let mut alpha = record("alpha", DatabaseStatus::Active);
        alpha.region = "eu-west-1".to_string();
        devops.insert(alpha.clone());

        let info = service.get_database_info(&alpha.id).await.unwrap();
        assert_eq!(info.name, "alpha");

        let endpoint = service.api_endpoint(&alpha.id).await.unwrap();
        assert_eq!(
            endpoint,
            format!("https://{}-eu-west-1.apps.astra.datastax.com/api/json", alpha.id)
        );

        let missing = service.get_database_info(&DatabaseId::generate()).await;
        assert!(matches!(missing, Err(ControlError::DatabaseNotFound(_))));
    }

    #[tokio::test]
    async fn queries_follow_listing() {
        let (devops, _resume, service) = setup();
        devops.insert(record("alpha", DatabaseStatus::Active));
        devops.insert(record("beta", DatabaseStatus::Hibernated));

        assert_eq!(service.list_names().await.unwrap(), vec!["alpha", "beta"]);
        assert_eq!(service.list_databases().await.unwrap().len(), 2);
        assert!(service.exists("beta").await.unwrap());
        assert!(!service.exists("gamma").await.unwrap());
    }

    #[tokio::test]
    async fn exists_by_id_skips_the_listing() {
        let (devops, _resume, service) = setup();
        let alpha = record("alpha", DatabaseStatus::Active);
        devops.insert(alpha.clone());

        assert!(service.exists_by_id(&alpha.id).await.unwrap());
        assert!(!service.exists_by_id(&DatabaseId::generate()).await.unwrap());
        assert_eq!(devops.list_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_wait() {
        let (devops, _resume, service) = setup();
        devops.insert(record("alpha", DatabaseStatus::Pending));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = service
            .ensure_active(&LifecycleRequest::new("alpha"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::Cancelled));
        assert_eq!(devops.find_calls(), 3);
    }
}
