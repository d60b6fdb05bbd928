//! Command-line arguments.

use std::path::PathBuf;

use astra_admin_auth::{AstraRc, TokenConfig};
use astra_admin_control::{AdminConfig, ClientGeneration, LifecycleRequest};
use astra_admin_core::{AstraEnvironment, CloudProvider, DatabaseId};
use clap::{Parser, Subcommand};

/// Astra Admin - manage Astra databases from the terminal.
#[derive(Parser, Debug)]
#[command(name = "astra-admin")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Application token; falls back to the environment, then ~/.astrarc.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Target environment.
    #[arg(long = "env", env = "ASTRA_ENV", default_value = "prod", global = true)]
    pub environment: AstraEnvironment,

    /// Path of the .astrarc file.
    #[arg(long, global = true)]
    pub astrarc: Option<PathBuf>,

    /// Section of the .astrarc file to read.
    #[arg(long, default_value = "default", global = true)]
    pub profile: String,

    /// Override the DevOps API base URL.
    #[arg(long, env = "ASTRA_DEVOPS_URL", hide = true, global = true)]
    pub devops_url: Option<String>,

    /// Always wait for activation, ignoring --no-wait.
    #[arg(long, global = true)]
    pub legacy: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false", global = true)]
    pub debug: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Database commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List usable databases.
    List,

    /// Create a database, or bring an existing one to active.
    Create {
        /// Database name.
        name: String,
        /// Cloud provider.
        #[arg(long, default_value = "gcp")]
        cloud: CloudProvider,
        /// Region.
        #[arg(long, default_value = "us-east1")]
        region: String,
        /// Initial keyspace.
        #[arg(long, default_value = "default_keyspace")]
        keyspace: String,
        /// Return as soon as the request is accepted.
        #[arg(long)]
        no_wait: bool,
    },

    /// Drop a database by id, or by name if the argument is not an id.
    Drop {
        /// Database id or name.
        target: String,
    },

    /// Show a database and its Data API endpoint.
    Info {
        /// Database id.
        id: DatabaseId,
    },

    /// Check whether a database exists, by id or by name.
    Exists {
        /// Database id or name.
        target: String,
    },
}

impl Args {
    /// Where to look for a token when `--token` is absent.
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            astrarc_path: self.astrarc.clone().or_else(AstraRc::default_path),
            section: self.profile.clone(),
            ..TokenConfig::default()
        }
    }

    /// Service configuration derived from the flags.
    #[must_use]
    pub fn admin_config(&self) -> AdminConfig {
        AdminConfig {
            environment: self.environment,
            generation: if self.legacy {
                ClientGeneration::Legacy
            } else {
                ClientGeneration::Current
            },
            devops_url: self.devops_url.clone(),
            ..AdminConfig::default()
        }
    }
}

impl Command {
    /// Lifecycle request for `create`.
    #[must_use]
    pub fn lifecycle_request(&self) -> Option<LifecycleRequest> {
        match self {
            Self::Create {
                name,
                cloud,
                region,
                keyspace,
                no_wait,
            } => Some(
                LifecycleRequest::new(name.clone())
                    .in_region(*cloud, region.clone())
                    .with_keyspace(keyspace.clone())
                    .wait(!no_wait),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_free_tier() {
        let args = Args::try_parse_from(["astra-admin", "create", "alpha"]).unwrap();
        let request = args.command.lifecycle_request().unwrap();

        assert_eq!(request.name, "alpha");
        assert_eq!(request.cloud_provider, CloudProvider::Gcp);
        assert_eq!(request.region, "us-east1");
        assert!(request.wait_for_active);
    }

    #[test]
    fn create_flags() {
        let args = Args::try_parse_from([
            "astra-admin",
            "create",
            "beta",
            "--cloud",
            "aws",
            "--region",
            "us-west-2",
            "--no-wait",
        ])
        .unwrap();
        let request = args.command.lifecycle_request().unwrap();

        assert_eq!(request.cloud_provider, CloudProvider::Aws);
        assert_eq!(request.region, "us-west-2");
        assert!(!request.wait_for_active);
    }

    #[test]
    fn global_flags_map_to_config() {
        let args = Args::try_parse_from([
            "astra-admin",
            "list",
            "--env",
            "dev",
            "--legacy",
            "--astrarc",
            "/tmp/rc",
            "--profile",
            "work",
        ])
        .unwrap();

        let config = args.admin_config();
        assert_eq!(config.environment, AstraEnvironment::Dev);
        assert_eq!(config.generation, ClientGeneration::Legacy);

        let tokens = args.token_config();
        assert_eq!(tokens.astrarc_path, Some(PathBuf::from("/tmp/rc")));
        assert_eq!(tokens.section, "work");
        assert_eq!(tokens.env_var, astra_admin_auth::TOKEN_ENV_VAR);
    }

    #[test]
    fn info_requires_an_id() {
        assert!(Args::try_parse_from(["astra-admin", "info", "not-an-id"]).is_err());
        let args = Args::try_parse_from([
            "astra-admin",
            "info",
            "3f0c6a52-1f4b-4c89-9a1e-7d2b8a0e4c11",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Info { .. }));
        assert!(args.command.lifecycle_request().is_none());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Args::try_parse_from(["astra-admin", "list", "--env", "staging"]).is_err());
    }
}
