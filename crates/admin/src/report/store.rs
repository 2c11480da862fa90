//! Collaborator seams of the report: session data and settings.
//!
//! Both traits are implemented over `PostgreSQL` in [`crate::db`] and in
//! memory in [`super::memory`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use visitors_online_core::{
    ConnectionId, CurrentPage, CustomerId, CustomerProfile, GuestId, PackedIpv4, ShopScope,
};

use crate::db::RepositoryError;

/// Which timestamp marks a session as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivitySource {
    /// Start of the session's open page view. Only sessions with an open
    /// page view qualify; one row per open view.
    OpenPageView,
    /// Start of the session itself. One row per session, no page name.
    SessionStart,
}

impl ActivitySource {
    /// Select the query contract for the per-page tracking flag.
    #[must_use]
    pub const fn for_page_views(page_views_enabled: bool) -> Self {
        if page_views_enabled {
            Self::OpenPageView
        } else {
            Self::SessionStart
        }
    }
}

/// One session joined with its guest, customer and (optionally) page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionActivity {
    pub connection_id: ConnectionId,
    pub guest_id: GuestId,
    /// Linked account; the host's `0` sentinel is already mapped to `None`.
    pub customer_id: Option<CustomerId>,
    /// Present when the linked account row exists.
    pub customer: Option<CustomerProfile>,
    pub ip_address: Option<PackedIpv4>,
    pub started_at: DateTime<Utc>,
    pub referrer_url: Option<String>,
    pub activity_at: DateTime<Utc>,
    pub page_name: Option<String>,
}

impl SessionActivity {
    /// Ordering key used to pick one row among several for the same entity.
    #[must_use]
    pub const fn recency(&self) -> (DateTime<Utc>, ConnectionId) {
        (self.activity_at, self.connection_id)
    }

    /// Current page as shown in the report.
    #[must_use]
    pub fn current_page(&self, page_views_enabled: bool) -> CurrentPage {
        if page_views_enabled {
            CurrentPage::from_page_type(self.page_name.clone())
        } else {
            CurrentPage::Unknown
        }
    }
}

/// Read-only access to the host's tracking tables.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Sessions of `scope` whose activity timestamp is after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying store cannot be read.
    async fn recent_activity(
        &self,
        scope: ShopScope,
        since: DateTime<Utc>,
        source: ActivitySource,
    ) -> Result<Vec<SessionActivity>, RepositoryError>;
}

/// String-keyed host settings.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Raw value of `key` as seen from `scope`, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the settings cannot be read.
    async fn get(&self, key: &str, scope: ShopScope) -> Result<Option<String>, RepositoryError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn recent_activity(
        &self,
        scope: ShopScope,
        since: DateTime<Utc>,
        source: ActivitySource,
    ) -> Result<Vec<SessionActivity>, RepositoryError> {
        (**self).recent_activity(scope, since, source).await
    }
}

#[async_trait]
impl<T: ConfigProvider + ?Sized> ConfigProvider for Arc<T> {
    async fn get(&self, key: &str, scope: ShopScope) -> Result<Option<String>, RepositoryError> {
        (**self).get(key, scope).await
    }
}
