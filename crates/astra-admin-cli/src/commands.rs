//! Command execution and output formatting.

use std::io::Write;

use anyhow::Context;
use astra_admin_control::{cancellable, ControlError, DatabaseAdmin};
use astra_admin_core::{DatabaseId, DatabaseRecord};
use tokio_util::sync::CancellationToken;

use crate::args::Command;

/// Run `command` against `admin`, writing human-readable output to `out`.
pub async fn run(
    admin: &dyn DatabaseAdmin,
    command: &Command,
    cancel: &CancellationToken,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::List => {
            let databases = cancellable(cancel, admin.list_databases()).await?;
            if databases.is_empty() {
                writeln!(out, "No databases")?;
            }
            for db in &databases {
                writeln!(out, "{:<24} {} {}", db.name, db.id, db.status)?;
            }
        }

        Command::Create { .. } => {
            let request = command
                .lifecycle_request()
                .context("create command without a request")?;
            let id = admin
                .ensure_active(&request, cancel)
                .await
                .with_context(|| format!("failed to activate database {}", request.name))?;
            writeln!(out, "{id}")?;
        }

        Command::Drop { target } => {
            let dropped = match target.parse::<DatabaseId>() {
                Ok(id) => admin.drop_database(&id, cancel).await?,
                Err(_) => admin.drop_database_by_name(target, cancel).await?,
            };
            if dropped {
                writeln!(out, "Dropped {target}")?;
            } else {
                writeln!(out, "No database named {target}")?;
            }
        }

        Command::Info { id } => {
            let record = cancellable(cancel, admin.get_database_info(id)).await?;
            let endpoint = cancellable(cancel, admin.api_endpoint(id)).await?;
            write_info(out, &record, &endpoint)?;
        }

        Command::Exists { target } => {
            let exists = match target.parse::<DatabaseId>() {
                Ok(id) => cancellable(cancel, admin.exists_by_id(&id)).await?,
                Err(_) => cancellable(cancel, admin.exists(target)).await?,
            };
            writeln!(out, "{exists}")?;
        }
    }

    Ok(())
}

/// Returns true if the failure came from the control plane and a retry
/// might succeed.
#[must_use]
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ControlError>()
        .is_some_and(ControlError::is_retriable)
}

fn write_info(out: &mut dyn Write, record: &DatabaseRecord, endpoint: &str) -> std::io::Result<()> {
    writeln!(out, "id:        {}", record.id)?;
    writeln!(out, "name:      {}", record.name)?;
    writeln!(out, "status:    {}", record.status)?;
    writeln!(out, "cloud:     {}", record.cloud_provider)?;
    writeln!(out, "region:    {}", record.region)?;
    if let Some(keyspace) = &record.keyspace {
        writeln!(out, "keyspace:  {keyspace}")?;
    }
    if let Some(created) = &record.creation_time {
        writeln!(out, "created:   {}", created.to_rfc3339())?;
    }
    writeln!(out, "endpoint:  {endpoint}")
}
