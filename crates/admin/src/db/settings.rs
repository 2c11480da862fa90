//! Host settings database operations.
//!
//! Reads the host's `configuration` table, where a setting may be stored
//! globally, per shop group or per shop. The most specific value wins.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use visitors_online_core::ShopScope;

use super::{RepositoryError, TablePrefix};
use crate::report::ConfigProvider;

/// `PostgreSQL`-backed [`ConfigProvider`].
#[derive(Debug, Clone)]
pub struct PgConfigProvider {
    pool: PgPool,
    lookup_sql: String,
}

impl PgConfigProvider {
    /// Create a provider reading `{prefix}configuration`.
    #[must_use]
    pub fn new(pool: PgPool, prefix: &TablePrefix) -> Self {
        Self {
            pool,
            lookup_sql: lookup_sql(prefix),
        }
    }
}

#[async_trait]
impl ConfigProvider for PgConfigProvider {
    #[instrument(skip(self))]
    async fn get(&self, key: &str, scope: ShopScope) -> Result<Option<String>, RepositoryError> {
        let (shop, shop_group) = scope.as_filter();

        let value = sqlx::query_scalar::<_, Option<String>>(&self.lookup_sql)
            .bind(key)
            .bind(shop)
            .bind(shop_group)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.flatten())
    }
}

/// Shop value, then group value (the shop's own group when only a shop is
/// given), then the global value.
fn lookup_sql(prefix: &TablePrefix) -> String {
    format!(
        r"
        SELECT value FROM {configuration}
        WHERE name = $1
          AND (
                ($2::INT IS NOT NULL AND id_shop = $2)
             OR (id_shop IS NULL AND id_shop_group = COALESCE(
                    $3::INT,
                    (SELECT s.id_shop_group FROM {shop} s WHERE s.id_shop = $2)
                ))
             OR (id_shop IS NULL AND id_shop_group IS NULL)
          )
        ORDER BY id_shop IS NULL, id_shop_group IS NULL
        LIMIT 1
        ",
        configuration = prefix.table("configuration"),
        shop = prefix.table("shop"),
    )
}
