//! In-process session store and settings.
//!
//! Holds the four tracking relations in memory and joins them the same way
//! the `PostgreSQL` store does. Used by tests and local demos.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use visitors_online_core::{
    CustomerId, CustomerProfile, Guest, GuestId, PageView, Session, ShopScope,
};

use super::store::{ActivitySource, ConfigProvider, SessionActivity, SessionStore};
use crate::db::RepositoryError;

/// Session store backed by plain collections.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Vec<Session>,
    guests: HashMap<GuestId, Guest>,
    customers: HashMap<CustomerId, CustomerProfile>,
    page_views: Vec<PageView>,
    failure: Option<String>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer account.
    #[must_use]
    pub fn with_customer(mut self, customer: CustomerProfile) -> Self {
        self.customers.insert(customer.id, customer);
        self
    }

    /// Add a guest identity.
    #[must_use]
    pub fn with_guest(mut self, guest: Guest) -> Self {
        self.guests.insert(guest.id, guest);
        self
    }

    /// Add a session.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.sessions.push(session);
        self
    }

    /// Add a page view.
    #[must_use]
    pub fn with_page_view(mut self, view: PageView) -> Self {
        self.page_views.push(view);
        self
    }

    /// Make every read fail as if the store were unreachable.
    #[must_use]
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    fn join(
        &self,
        session: &Session,
        activity_at: DateTime<Utc>,
        page_name: Option<String>,
    ) -> Option<SessionActivity> {
        // Sessions without a guest row are invisible, as with an inner join.
        let guest = self.guests.get(&session.guest_id)?;
        let customer = guest
            .customer_id
            .and_then(|id| self.customers.get(&id))
            .cloned();

        Some(SessionActivity {
            connection_id: session.id,
            guest_id: session.guest_id,
            customer_id: guest.customer_id,
            customer,
            ip_address: session.ip_address,
            started_at: session.started_at,
            referrer_url: session.referrer_url.clone(),
            activity_at,
            page_name,
        })
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn recent_activity(
        &self,
        scope: ShopScope,
        since: DateTime<Utc>,
        source: ActivitySource,
    ) -> Result<Vec<SessionActivity>, RepositoryError> {
        if let Some(reason) = &self.failure {
            return Err(RepositoryError::Unavailable(reason.clone()));
        }

        let in_scope = self
            .sessions
            .iter()
            .filter(|s| scope.contains(s.shop_id, s.shop_group_id));

        let rows: Vec<SessionActivity> = match source {
            ActivitySource::SessionStart => in_scope
                .filter(|s| s.started_at > since)
                .filter_map(|s| self.join(s, s.started_at, None))
                .collect(),
            ActivitySource::OpenPageView => in_scope
                .flat_map(|s| {
                    self.page_views
                        .iter()
                        .filter(move |v| v.session_id == s.id)
                        .filter(move |v| v.is_open() && v.view_started_at > since)
                        .filter_map(move |v| {
                            self.join(s, v.view_started_at, v.page_type_name.clone())
                        })
                })
                .collect(),
        };

        Ok(rows)
    }
}

/// Settings from a fixed map, identical for every shop scope.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    values: HashMap<String, String>,
    failure: Option<String>,
}

impl StaticConfigProvider {
    /// Create a provider with no settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Make every read fail.
    #[must_use]
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn get(&self, key: &str, _scope: ShopScope) -> Result<Option<String>, RepositoryError> {
        if let Some(reason) = &self.failure {
            return Err(RepositoryError::Unavailable(reason.clone()));
        }
        Ok(self.values.get(key).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use visitors_online_core::{ConnectionId, ShopGroupId, ShopId};

    use super::*;

    fn at(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, min, 0).unwrap()
    }

    fn session(id: i32, guest: i32, shop: i32, started: DateTime<Utc>) -> Session {
        Session {
            id: ConnectionId::new(id),
            guest_id: GuestId::new(guest),
            shop_id: ShopId::new(shop),
            shop_group_id: ShopGroupId::new(1),
            ip_address: None,
            started_at: started,
            referrer_url: None,
        }
    }

    fn guest(id: i32) -> Guest {
        Guest {
            id: GuestId::new(id),
            customer_id: None,
        }
    }

    #[tokio::test]
    async fn test_session_start_rows() {
        let store = InMemorySessionStore::new()
            .with_guest(guest(1))
            .with_session(session(10, 1, 1, at(50)))
            .with_session(session(11, 1, 1, at(20)));

        let rows = store
            .recent_activity(ShopScope::All, at(30), ActivitySource::SessionStart)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].connection_id, ConnectionId::new(10));
        assert_eq!(rows[0].activity_at, at(50));
        assert_eq!(rows[0].page_name, None);
    }

    #[tokio::test]
    async fn test_open_page_view_rows() {
        let store = InMemorySessionStore::new()
            .with_guest(guest(1))
            .with_session(session(10, 1, 1, at(0)))
            .with_page_view(PageView {
                session_id: ConnectionId::new(10),
                page_type_name: Some("product".to_string()),
                view_started_at: at(55),
                view_ended_at: None,
            })
            .with_page_view(PageView {
                session_id: ConnectionId::new(10),
                page_type_name: Some("index".to_string()),
                view_started_at: at(50),
                view_ended_at: Some(at(55)),
            });

        let rows = store
            .recent_activity(ShopScope::All, at(45), ActivitySource::OpenPageView)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].page_name.as_deref(), Some("product"));
        assert_eq!(rows[0].activity_at, at(55));
        assert_eq!(rows[0].started_at, at(0));
    }

    #[tokio::test]
    async fn test_scope_and_missing_guest_filtered() {
        let store = InMemorySessionStore::new()
            .with_guest(guest(1))
            .with_session(session(10, 1, 1, at(50)))
            .with_session(session(11, 1, 2, at(50)))
            .with_session(session(12, 99, 1, at(50)));

        let rows = store
            .recent_activity(
                ShopScope::Shop(ShopId::new(1)),
                at(50) - Duration::minutes(15),
                ActivitySource::SessionStart,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].connection_id, ConnectionId::new(10));
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemorySessionStore::new().failing("connection refused");
        let err = store
            .recent_activity(ShopScope::All, at(0), ActivitySource::SessionStart)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_static_config() {
        let config = StaticConfigProvider::new().with("KEY", "value");
        assert_eq!(
            config.get("KEY", ShopScope::All).await.unwrap().as_deref(),
            Some("value")
        );
        assert_eq!(config.get("OTHER", ShopScope::All).await.unwrap(), None);
    }
}
