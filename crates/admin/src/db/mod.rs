//! Database access to the host platform's `PostgreSQL` tables.
//!
//! # Tables (owned by the host, read-only here)
//!
//! - `{prefix}connections` - One row per browsing session
//! - `{prefix}connections_page` - Page views per session (`time_end` NULL while open)
//! - `{prefix}page` / `{prefix}page_type` - Page identity and type name
//! - `{prefix}guest` - Visitor identity, optionally linked to a customer
//! - `{prefix}customer` - Customer accounts
//! - `{prefix}configuration` - Host settings (`name`, `value`, shop/group scope)
//!
//! The report only reads, so it can be pointed at a read replica.

pub mod connections;
pub mod settings;

use std::fmt;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use connections::PgSessionStore;
pub use settings::PgConfigProvider;

/// Default host table prefix.
pub const DEFAULT_TABLE_PREFIX: &str = "ps_";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Invalid table prefix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("table prefix may only contain ASCII letters, digits and underscores: {0:?}")]
pub struct InvalidTablePrefix(pub String);

/// Prefix prepended to every host table name.
///
/// Table names cannot be bound as query parameters, so the prefix is
/// restricted to `[A-Za-z0-9_]` before it is spliced into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrefix(String);

impl TablePrefix {
    /// Validate a prefix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTablePrefix` if the prefix contains anything but
    /// ASCII letters, digits or underscores.
    pub fn parse(prefix: &str) -> Result<Self, InvalidTablePrefix> {
        if prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            Ok(Self(prefix.to_owned()))
        } else {
            Err(InvalidTablePrefix(prefix.to_owned()))
        }
    }

    /// Full name of a host table.
    #[must_use]
    pub fn table(&self, name: &str) -> String {
        format!("{}{name}", self.0)
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TablePrefix {
    fn default() -> Self {
        Self(DEFAULT_TABLE_PREFIX.to_owned())
    }
}

impl fmt::Display for TablePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_prefix_valid() {
        let prefix = TablePrefix::parse("shop_01_").unwrap();
        assert_eq!(prefix.table("guest"), "shop_01_guest");
        assert_eq!(TablePrefix::parse("").unwrap().table("guest"), "guest");
        assert_eq!(TablePrefix::default().as_str(), "ps_");
    }

    #[test]
    fn test_table_prefix_rejects_sql() {
        for bad in ["ps_; DROP TABLE x", "ps-", "ps.", "p s", "\"ps\""] {
            assert!(TablePrefix::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Unavailable("timeout".to_string());
        assert_eq!(err.to_string(), "store unavailable: timeout");
    }
}
