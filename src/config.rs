//! Central configuration for the storefront binary.
//!
//! Every setting comes from a CLI flag with an environment fallback, and is
//! split into the per-crate configs here.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use server::{ServerConfig, StateConfig};
use storage::StorageConfig;

/// Storefront - e-commerce backend with real-time product updates
#[derive(Parser, Debug, Clone)]
#[command(name = "storefront")]
#[command(about = "E-commerce backend with real-time product updates")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "STORE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "STORE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite database file (omit for an in-memory store)
    #[arg(long, env = "STORE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Secret used to sign session cookies
    #[arg(long, env = "STORE_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Session lifetime in seconds (capped at 366 days)
    #[arg(long, env = "STORE_SESSION_TTL_SECS", default_value_t = 86_400)]
    pub session_ttl_secs: u64,

    /// Accounts registered with this email become admins
    #[arg(long, env = "STORE_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log: String,
}

/// Per-crate configs derived from [`Args`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub state: StateConfig,
    /// True when no secret was configured and a random one was generated.
    pub ephemeral_secret: bool,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Self {
        let storage = match &args.db_path {
            Some(path) => StorageConfig::from_path(path),
            None => StorageConfig::default(),
        };

        let ephemeral_secret = args.session_secret.is_none();
        let session_secret = args
            .session_secret
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        Self {
            server: ServerConfig {
                port: args.port,
                host: args.host,
            },
            storage,
            state: StateConfig {
                session_secret,
                session_ttl: Duration::from_secs(args.session_ttl_secs),
                admin_email: args.admin_email,
            },
            ephemeral_secret,
        }
    }
}
