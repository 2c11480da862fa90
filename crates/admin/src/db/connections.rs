//! Session store over the host's connection tracking tables.
//!
//! Queries are built once per store from the validated table prefix and
//! checked at runtime; every value is a bound parameter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use visitors_online_core::{
    ConnectionId, CustomerId, CustomerProfile, GuestId, PackedIpv4, ShopScope,
};

use super::{RepositoryError, TablePrefix};
use crate::report::{ActivitySource, SessionActivity, SessionStore};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for both activity queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionActivityRow {
    connection_id: i32,
    guest_id: i32,
    customer_link: Option<i32>,
    profile_id: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
    ip_address: Option<i64>,
    started_at: DateTime<Utc>,
    referrer_url: Option<String>,
    activity_at: DateTime<Utc>,
    page_name: Option<String>,
}

impl TryFrom<SessionActivityRow> for SessionActivity {
    type Error = RepositoryError;

    fn try_from(row: SessionActivityRow) -> Result<Self, Self::Error> {
        // Rejected, not dropped: a missing address is never excluded.
        let ip_address = row
            .ip_address
            .map(|raw| {
                PackedIpv4::from_stored(raw).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "connection {} has out of range ip_address {raw}",
                        row.connection_id
                    ))
                })
            })
            .transpose()?;

        let customer = row.profile_id.map(|id| CustomerProfile {
            id: CustomerId::new(id),
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
        });

        Ok(Self {
            connection_id: ConnectionId::new(row.connection_id),
            guest_id: GuestId::new(row.guest_id),
            customer_id: CustomerId::from_link(row.customer_link),
            customer,
            ip_address,
            started_at: row.started_at,
            referrer_url: row.referrer_url,
            activity_at: row.activity_at,
            page_name: row.page_name,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// `PostgreSQL`-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
    open_page_view_sql: String,
    session_start_sql: String,
}

impl PgSessionStore {
    /// Create a store reading the host tables named with `prefix`.
    #[must_use]
    pub fn new(pool: PgPool, prefix: &TablePrefix) -> Self {
        Self {
            pool,
            open_page_view_sql: open_page_view_sql(prefix),
            session_start_sql: session_start_sql(prefix),
        }
    }

    fn sql_for(&self, source: ActivitySource) -> &str {
        match source {
            ActivitySource::OpenPageView => &self.open_page_view_sql,
            ActivitySource::SessionStart => &self.session_start_sql,
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[instrument(skip(self))]
    async fn recent_activity(
        &self,
        scope: ShopScope,
        since: DateTime<Utc>,
        source: ActivitySource,
    ) -> Result<Vec<SessionActivity>, RepositoryError> {
        let (shop, shop_group) = scope.as_filter();

        let rows = sqlx::query_as::<_, SessionActivityRow>(self.sql_for(source))
            .bind(since)
            .bind(shop)
            .bind(shop_group)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), "Fetched session activity");
        rows.into_iter()
            .map(SessionActivity::try_from)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| tracing::error!(error = %e, "Corrupt session activity row"))
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Columns shared by both queries; `{activity}` and `{page}` differ.
fn select_columns(activity: &str, page: &str) -> String {
    format!(
        r"
        SELECT c.id_connections AS connection_id,
               c.id_guest AS guest_id,
               g.id_customer AS customer_link,
               u.id_customer AS profile_id,
               u.firstname AS first_name,
               u.lastname AS last_name,
               c.ip_address AS ip_address,
               c.date_add AS started_at,
               c.http_referer AS referrer_url,
               {activity} AS activity_at,
               {page} AS page_name
        "
    )
}

const SCOPE_FILTER: &str = r"
          AND ($2::INT IS NULL OR c.id_shop = $2)
          AND ($3::INT IS NULL OR c.id_shop_group = $3)
";

/// One row per open page view started after `$1`.
fn open_page_view_sql(prefix: &TablePrefix) -> String {
    format!(
        r"{columns}
        FROM {connections} c
        INNER JOIN {connections_page} cp ON cp.id_connections = c.id_connections
        LEFT JOIN {page} p ON p.id_page = cp.id_page
        LEFT JOIN {page_type} pt ON pt.id_page_type = p.id_page_type
        INNER JOIN {guest} g ON g.id_guest = c.id_guest
        LEFT JOIN {customer} u ON u.id_customer = g.id_customer
        WHERE cp.time_end IS NULL
          AND cp.time_start > $1
        {SCOPE_FILTER}",
        columns = select_columns("cp.time_start", "pt.name"),
        connections = prefix.table("connections"),
        connections_page = prefix.table("connections_page"),
        page = prefix.table("page"),
        page_type = prefix.table("page_type"),
        guest = prefix.table("guest"),
        customer = prefix.table("customer"),
    )
}

/// One row per session started after `$1`.
fn session_start_sql(prefix: &TablePrefix) -> String {
    format!(
        r"{columns}
        FROM {connections} c
        INNER JOIN {guest} g ON g.id_guest = c.id_guest
        LEFT JOIN {customer} u ON u.id_customer = g.id_customer
        WHERE c.date_add > $1
        {SCOPE_FILTER}",
        columns = select_columns("c.date_add", "NULL::TEXT"),
        connections = prefix.table("connections"),
        guest = prefix.table("guest"),
        customer = prefix.table("customer"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row() -> SessionActivityRow {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        SessionActivityRow {
            connection_id: 5,
            guest_id: 9,
            customer_link: Some(0),
            profile_id: None,
            first_name: None,
            last_name: None,
            ip_address: Some(3_405_803_781),
            started_at: at,
            referrer_url: Some("https://example.com/".to_string()),
            activity_at: at,
            page_name: None,
        }
    }

    #[test]
    fn test_row_conversion_normalizes_guest_link() {
        let activity = SessionActivity::try_from(row()).unwrap();
        assert_eq!(activity.customer_id, None);
        assert_eq!(activity.customer, None);
        assert_eq!(
            activity.ip_address.map(|ip| ip.to_string()).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn test_row_conversion_with_customer() {
        let mut raw = row();
        raw.customer_link = Some(12);
        raw.profile_id = Some(12);
        raw.first_name = Some("Ada".to_string());
        raw.ip_address = None;

        let activity = SessionActivity::try_from(raw).unwrap();
        assert_eq!(activity.customer_id, Some(CustomerId::new(12)));
        let profile = activity.customer.unwrap();
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "");
        assert_eq!(activity.ip_address, None);
    }

    #[test]
    fn test_row_conversion_rejects_out_of_range_ip() {
        for stored in [-5, i64::from(u32::MAX) + 1] {
            let mut raw = row();
            raw.ip_address = Some(stored);

            let err = SessionActivity::try_from(raw).unwrap_err();
            assert!(matches!(err, RepositoryError::DataCorruption(_)), "{stored}");
            assert!(err.to_string().contains("connection 5"));
        }
    }

    #[test]
    fn test_queries_use_prefix_and_parameters() {
        let prefix = TablePrefix::parse("shop_").unwrap();
        let tracked = open_page_view_sql(&prefix);
        assert!(tracked.contains("FROM shop_connections c"));
        assert!(tracked.contains("shop_connections_page cp"));
        assert!(tracked.contains("cp.time_end IS NULL"));
        assert!(tracked.contains("cp.time_start > $1"));
        assert!(tracked.contains("c.id_shop = $2"));

        let untracked = session_start_sql(&prefix);
        assert!(untracked.contains("c.date_add > $1"));
        assert!(!untracked.contains("connections_page"));
        assert!(untracked.contains("c.id_shop_group = $3"));
    }
}
