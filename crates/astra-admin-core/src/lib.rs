//! Core types and utilities for astra-admin.
//!
//! This crate provides the foundational types shared by the other astra-admin crates:
//!
//! - **Identifiers**: the strongly-typed [`DatabaseId`]
//! - **Domain types**: database records, statuses, cloud providers, environments
//! - **Error types**: common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use astra_admin_core::{DatabaseId, DatabaseStatus};
//!
//! let id: DatabaseId = "3f0c6a52-1f4b-4c89-9a1e-7d2b8a0e4c11".parse().unwrap();
//! assert_eq!(id.to_string(), "3f0c6a52-1f4b-4c89-9a1e-7d2b8a0e4c11");
//!
//! let status = DatabaseStatus::from("HIBERNATED".to_string());
//! assert_eq!(status, DatabaseStatus::Hibernated);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod env;
pub mod error;
pub mod ids;
pub mod types;

pub use env::AstraEnvironment;
pub use error::{CoreError, Result};
pub use ids::{DatabaseId, IdError};
pub use types::{CloudProvider, DatabaseRecord, DatabaseStatus, WorkloadKind};
