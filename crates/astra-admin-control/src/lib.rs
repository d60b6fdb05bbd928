//! Lifecycle orchestration for Astra databases.
//!
//! This crate drives a database to the active state on demand: it finds the
//! database by name, creates it when absent, wakes it when hibernated, and
//! polls the control plane until it reports `ACTIVE`. It also tears
//! databases down.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CLI / embedding caller                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        AdminService                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Resolver   │ │   Poller    │ │    Lifecycle        │    │
//! │  │  (by name)  │ │  (5s/180s)  │ │    State Machine    │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌──────────────┐              ┌──────────────┐
//!        │  DevOps API  │              │ Resume probe │
//!        │  (control)   │              │  (REST API)  │
//!        └──────────────┘              └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use astra_admin_auth::{resolve_token, TokenConfig};
//! use astra_admin_control::{AdminConfig, AdminService, DatabaseAdmin, LifecycleRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let token = resolve_token(&TokenConfig::default(), None)?.token;
//! let admin = AdminService::connect(AdminConfig::default(), token)?;
//!
//! let cancel = CancellationToken::new();
//! let id = admin
//!     .ensure_active(&LifecycleRequest::new("my-db"), &cancel)
//!     .await?;
//!
//! println!("Database {id} is active");
//! # Ok(())
//! # }
//! ```
//!
//! See the [`lifecycle`] module for the status state machine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod devops_client;
pub mod error;
pub mod lifecycle;
pub mod poller;
pub mod resolver;
pub mod resume;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub use devops_client::MockDevopsClient;
pub use devops_client::{DevopsClient, HttpDevopsClient};
pub use error::{ControlError, Result};
pub use poller::{cancellable, StatusPoller};
pub use resolver::DatabaseResolver;
#[cfg(any(test, feature = "test-utils"))]
pub use resume::RecordingResumeTrigger;
pub use resume::{HttpResumeTrigger, ProbeError, ResumeTrigger};
pub use service::{AdminService, DatabaseAdmin};
pub use types::{AdminConfig, ClientGeneration, CreateDatabaseRequest, LifecycleRequest};

// Re-export commonly used types from dependencies for convenience
pub use astra_admin_core::{AstraEnvironment, CloudProvider, DatabaseId, DatabaseRecord, DatabaseStatus};
