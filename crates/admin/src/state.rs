//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{PgConfigProvider, PgSessionStore, TablePrefix};
use crate::report::{ConfigProvider, OnlinePresenceReport, SessionStore};

/// Report over type-erased collaborators, so handlers work with any store.
pub type LiveReport = OnlinePresenceReport<Arc<dyn SessionStore>, Arc<dyn ConfigProvider>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    report: LiveReport,
}

impl AppState {
    /// Wrap an already assembled report.
    #[must_use]
    pub fn new(report: LiveReport) -> Self {
        Self {
            inner: Arc::new(AppStateInner { report }),
        }
    }

    /// Report reading sessions and settings from the host database.
    #[must_use]
    pub fn from_pool(pool: PgPool, prefix: &TablePrefix) -> Self {
        Self::with_collaborators(
            PgSessionStore::new(pool.clone(), prefix),
            PgConfigProvider::new(pool, prefix),
        )
    }

    /// Report over arbitrary store and settings implementations.
    #[must_use]
    pub fn with_collaborators(
        store: impl SessionStore + 'static,
        config: impl ConfigProvider + 'static,
    ) -> Self {
        let store: Arc<dyn SessionStore> = Arc::new(store);
        let config: Arc<dyn ConfigProvider> = Arc::new(config);
        Self::new(OnlinePresenceReport::new(store, config))
    }

    /// Returns the live visitors report.
    #[must_use]
    pub fn report(&self) -> &LiveReport {
        &self.inner.report
    }
}
