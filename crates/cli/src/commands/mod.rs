//! Subcommand implementations.

pub mod maintenance_ips;
pub mod report;

use thiserror::Error;

use visitors_online_admin::config::{AdminConfig, ConfigError};
use visitors_online_admin::db::{self, PgConfigProvider, PgSessionStore};
use visitors_online_admin::report::{OnlinePresenceReport, ReportError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// The report could not be computed.
    #[error("{0}")]
    Report(#[from] ReportError),

    /// Output could not be encoded.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

type PgReport = OnlinePresenceReport<PgSessionStore, PgConfigProvider>;

/// Connect to the host database described by the environment.
async fn connect() -> Result<PgReport, CommandError> {
    let config = AdminConfig::from_env()?;

    tracing::info!(table_prefix = %config.table_prefix, "Connecting to host database...");
    let pool = db::create_pool(config.report_database_url()).await?;

    Ok(OnlinePresenceReport::new(
        PgSessionStore::new(pool.clone(), &config.table_prefix),
        PgConfigProvider::new(pool, &config.table_prefix),
    ))
}
