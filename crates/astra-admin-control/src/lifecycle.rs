//! Database activation state machine.
//!
//! This module decides, from an observed status, what the orchestrator has to
//! do to get a database to `ACTIVE`.
//!
//! # State Machine
//!
//! ```text
//!        (absent)
//!           │ create
//!           ▼
//!     ┌───────────┐     ┌──────────────┐
//!     │  PENDING  │────▶│ INITIALIZING │──────┐
//!     └───────────┘     └──────────────┘      │
//!                                             ▼
//!     ┌─────────────┐  resume  ┌──────────┐  ┌────────┐
//!     │ HIBERNATED  │─────────▶│ RESUMING │─▶│ ACTIVE │◄──┐
//!     └─────────────┘          └──────────┘  └────────┘   │
//!                                                │        │
//!                                                ▼        │
//!                                         ┌─────────────┐ │
//!                                         │ MAINTENANCE │─┘
//!                                         └─────────────┘
//!
//!     anything else (ERROR, TERMINATING, PARKED, ...) → cannot activate
//! ```

use astra_admin_core::{DatabaseId, DatabaseStatus};

use crate::error::{ControlError, Result};

/// What the orchestrator must do for a database in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPlan {
    /// Already active; nothing to do.
    Ready,
    /// Transitioning on its own; wait if requested.
    AwaitTransition,
    /// Hibernated; nudge it, then wait if requested.
    Resume,
}

/// Plan the activation of a database in `status`.
///
/// # Errors
///
/// Returns `ControlError::IllegalState` for any status that cannot lead to
/// `ACTIVE`.
pub fn plan_activation(database_id: &DatabaseId, status: &DatabaseStatus) -> Result<ActivationPlan> {
    if is_active(status) {
        Ok(ActivationPlan::Ready)
    } else if is_transitional(status) {
        Ok(ActivationPlan::AwaitTransition)
    } else if can_resume(status) {
        Ok(ActivationPlan::Resume)
    } else {
        Err(ControlError::IllegalState {
            database_id: *database_id,
            status: status.clone(),
        })
    }
}

/// Returns true if the database can serve traffic.
#[must_use]
pub const fn is_active(status: &DatabaseStatus) -> bool {
    matches!(status, DatabaseStatus::Active)
}

/// Returns true if the database will reach `ACTIVE` without intervention.
#[must_use]
pub const fn is_transitional(status: &DatabaseStatus) -> bool {
    matches!(
        status,
        DatabaseStatus::Maintenance
            | DatabaseStatus::Initializing
            | DatabaseStatus::Pending
            | DatabaseStatus::Resuming
    )
}

/// Returns true if the database needs a resume nudge.
#[must_use]
pub const fn can_resume(status: &DatabaseStatus) -> bool {
    matches!(status, DatabaseStatus::Hibernated)
}

/// Returns true if the database is being or has been terminated.
///
/// Such records are no longer databases from the caller's point of view.
#[must_use]
pub fn is_terminated(status: &DatabaseStatus) -> bool {
    match status {
        DatabaseStatus::Other(raw) => {
            raw.eq_ignore_ascii_case("TERMINATING") || raw.eq_ignore_ascii_case("TERMINATED")
        }
        _ => false,
    }
}
