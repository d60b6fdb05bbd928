//! Astra Admin CLI - manage Astra databases.
//!
//! This is the entry point for the `astra-admin` binary.

mod args;
mod commands;

use std::io;

use anyhow::Context;
use astra_admin_auth::resolve_token;
use astra_admin_control::AdminService;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.debug {
        "info,astra_admin=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Resolve credentials once and hand them to the service
    let resolved = resolve_token(&args.token_config(), args.token.as_deref())
        .context("no usable application token")?;
    tracing::debug!(source = ?resolved.source, "Resolved application token");

    let admin = AdminService::connect(args.admin_config(), resolved.token)?;

    // Ctrl-C cancels whatever is running
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });

    let mut stdout = io::stdout().lock();
    let result = commands::run(&admin, &args.command, &cancel, &mut stdout).await;
    if let Err(e) = &result {
        if commands::is_transient(e) {
            tracing::warn!("Failure looks transient, retrying may succeed");
        }
    }
    result
}
