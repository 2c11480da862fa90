//! Live visitors report.
//!
//! Builds a snapshot of who is browsing the store right now: signed-in
//! customers and anonymous visitors whose last activity falls within the
//! online window. Data comes from the host's tracking tables through a
//! [`SessionStore`]; the two host settings that shape the report come from a
//! [`ConfigProvider`]. Both are injected, nothing is looked up globally.
//!
//! # Rules
//!
//! - A session is online when its activity timestamp is strictly after
//!   `now - 15 minutes`. With per-page tracking on, the activity timestamp is
//!   the start of the session's open page view; otherwise the session start.
//! - Sessions from maintenance IPs are dropped from both lists.
//! - Customers are listed once each, keeping their most recent session, and
//!   ordered by first then last name.
//! - Visitors are listed per session, most recent first.
//!
//! Store failures surface as [`ReportError::DataUnavailable`] so callers can
//! tell "nobody online" apart from "could not ask".

pub mod memory;
pub mod settings;
pub mod store;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use visitors_online_core::{
    CustomerOnlineEntry, ExcludedIpSet, ReferrerHost, ShopScope, VisitorOnlineEntry,
};

use crate::db::RepositoryError;

pub use memory::{InMemorySessionStore, StaticConfigProvider};
pub use settings::{MAINTENANCE_IP_KEY, PAGE_VIEWS_KEY, ReportSettings};
pub use store::{ActivitySource, ConfigProvider, SessionActivity, SessionStore};

/// Length of the online window.
pub const ONLINE_WINDOW_MINUTES: i64 = 15;

/// Errors produced while computing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The tracking data or settings could not be read.
    #[error("visitor data unavailable: {0}")]
    DataUnavailable(#[from] RepositoryError),
}

/// Report rows plus their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineReport<T> {
    entries: Vec<T>,
    total_count: usize,
}

impl<T> OnlineReport<T> {
    /// The rows in display order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns true when nobody matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

impl<T> From<Vec<T>> for OnlineReport<T> {
    fn from(entries: Vec<T>) -> Self {
        Self {
            total_count: entries.len(),
            entries,
        }
    }
}

impl<T> Default for OnlineReport<T> {
    fn default() -> Self {
        Vec::new().into()
    }
}

/// Everything a view needs to render the live visitors panel.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceSnapshot {
    pub customers: OnlineReport<CustomerOnlineEntry>,
    pub visitors: OnlineReport<VisitorOnlineEntry>,
    /// When off, the view should explain that current pages are not tracked.
    pub page_views_enabled: bool,
    pub excluded_ip_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Start of the online window for `now`; activity must be strictly after it.
#[must_use]
pub fn online_since(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(ONLINE_WINDOW_MINUTES)
}

/// Computes the live visitors report.
#[derive(Debug, Clone)]
pub struct OnlinePresenceReport<S, C> {
    store: S,
    config: C,
}

impl<S, C> OnlinePresenceReport<S, C>
where
    S: SessionStore,
    C: ConfigProvider,
{
    /// Create a report over the given collaborators.
    #[must_use]
    pub const fn new(store: S, config: C) -> Self {
        Self { store, config }
    }

    /// Returns the settings provider.
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Read the per-page tracking flag and the maintenance IP list.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::DataUnavailable` if the settings cannot be read.
    #[instrument(skip(self))]
    pub async fn load_settings(&self, scope: ShopScope) -> Result<ReportSettings, ReportError> {
        let page_views = self.config.get(PAGE_VIEWS_KEY, scope).await?;
        let maintenance_ips = self.config.get(MAINTENANCE_IP_KEY, scope).await?;

        let settings =
            ReportSettings::from_values(page_views.as_deref(), maintenance_ips.as_deref());
        tracing::debug!(
            page_views_enabled = settings.page_views_enabled,
            excluded_ips = settings.excluded_ips.len(),
            "Loaded report settings"
        );
        Ok(settings)
    }

    /// Signed-in customers currently online, one row per customer.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::DataUnavailable` if the session store fails.
    #[instrument(skip(self, excluded_ips), fields(excluded = excluded_ips.len()))]
    pub async fn compute_online_customers(
        &self,
        now: DateTime<Utc>,
        page_views_enabled: bool,
        excluded_ips: &ExcludedIpSet,
        scope: ShopScope,
    ) -> Result<OnlineReport<CustomerOnlineEntry>, ReportError> {
        let rows = self
            .live_activity(now, page_views_enabled, excluded_ips, scope)
            .await?;
        Ok(aggregate_customers(rows, page_views_enabled))
    }

    /// Anonymous visitor sessions currently online, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::DataUnavailable` if the session store fails.
    #[instrument(skip(self, excluded_ips), fields(excluded = excluded_ips.len()))]
    pub async fn compute_online_visitors(
        &self,
        now: DateTime<Utc>,
        page_views_enabled: bool,
        excluded_ips: &ExcludedIpSet,
        scope: ShopScope,
    ) -> Result<OnlineReport<VisitorOnlineEntry>, ReportError> {
        let rows = self
            .live_activity(now, page_views_enabled, excluded_ips, scope)
            .await?;
        Ok(aggregate_visitors(rows, page_views_enabled))
    }

    /// Load settings once and compute both lists.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::DataUnavailable` if settings or sessions cannot
    /// be read. A failure of either list fails the whole snapshot.
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        now: DateTime<Utc>,
        scope: ShopScope,
    ) -> Result<PresenceSnapshot, ReportError> {
        let settings = self.load_settings(scope).await?;
        let enabled = settings.page_views_enabled;
        let excluded = &settings.excluded_ips;

        let (customers, visitors) = tokio::try_join!(
            self.compute_online_customers(now, enabled, excluded, scope),
            self.compute_online_visitors(now, enabled, excluded, scope),
        )?;

        tracing::info!(
            customers = customers.total_count(),
            visitors = visitors.total_count(),
            page_views_enabled = enabled,
            "Computed live visitors snapshot"
        );

        Ok(PresenceSnapshot {
            customers,
            visitors,
            page_views_enabled: enabled,
            excluded_ip_count: excluded.len(),
            generated_at: now,
        })
    }

    async fn live_activity(
        &self,
        now: DateTime<Utc>,
        page_views_enabled: bool,
        excluded_ips: &ExcludedIpSet,
        scope: ShopScope,
    ) -> Result<Vec<SessionActivity>, ReportError> {
        let since = online_since(now);
        let source = ActivitySource::for_page_views(page_views_enabled);

        let rows = self.store.recent_activity(scope, since, source).await?;
        let fetched = rows.len();

        let live: Vec<SessionActivity> = rows
            .into_iter()
            .filter(|row| row.activity_at > since)
            .filter(|row| !excluded_ips.contains(row.ip_address))
            .collect();

        tracing::debug!(fetched, live = live.len(), ?source, "Filtered session activity");
        Ok(live)
    }
}

/// Keep, per key, the row with the greatest recency.
fn latest_by<K, F>(rows: Vec<SessionActivity>, key: F) -> HashMap<K, SessionActivity>
where
    K: std::hash::Hash + Eq,
    F: Fn(&SessionActivity) -> Option<K>,
{
    let mut latest: HashMap<K, SessionActivity> = HashMap::new();
    for row in rows {
        let Some(k) = key(&row) else {
            continue;
        };
        match latest.entry(k) {
            Entry::Occupied(mut slot) => {
                if row.recency() > slot.get().recency() {
                    slot.insert(row);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }
    latest
}

fn aggregate_customers(
    rows: Vec<SessionActivity>,
    page_views_enabled: bool,
) -> OnlineReport<CustomerOnlineEntry> {
    // Linked accounts whose customer row is gone are dropped, as with an inner join.
    let latest = latest_by(rows, |row| row.customer_id.filter(|_| row.customer.is_some()));

    let mut entries: Vec<CustomerOnlineEntry> = latest
        .into_values()
        .filter_map(|row| {
            let current_page = row.current_page(page_views_enabled);
            let profile = row.customer?;
            Some(CustomerOnlineEntry {
                customer_id: profile.id,
                first_name: profile.first_name,
                last_name: profile.last_name,
                current_page,
            })
        })
        .collect();

    // Case-insensitive like the host collation; exact text and id break ties.
    entries.sort_by_cached_key(|c| {
        (
            c.first_name.to_lowercase(),
            c.last_name.to_lowercase(),
            c.first_name.clone(),
            c.last_name.clone(),
            c.customer_id,
        )
    });
    entries.into()
}

fn aggregate_visitors(
    rows: Vec<SessionActivity>,
    page_views_enabled: bool,
) -> OnlineReport<VisitorOnlineEntry> {
    // Several open page views of one session collapse into its latest view.
    let latest = latest_by(rows, |row| row.customer_id.is_none().then_some(row.connection_id));

    let mut entries: Vec<VisitorOnlineEntry> = latest
        .into_values()
        .map(|row| VisitorOnlineEntry {
            connection_id: row.connection_id,
            guest_id: row.guest_id,
            ip_address: row.ip_address,
            started_at: row.started_at,
            last_activity_at: row.activity_at,
            current_page: row.current_page(page_views_enabled),
            referrer_host: ReferrerHost::from_referrer(row.referrer_url.as_deref()),
        })
        .collect();

    entries.sort_by(|a, b| {
        (b.last_activity_at, b.connection_id).cmp(&(a.last_activity_at, a.connection_id))
    });
    entries.into()
}
