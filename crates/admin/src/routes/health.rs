//! Liveness and readiness checks.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use visitors_online_core::ShopScope;

use crate::report::{ConfigProvider, PAGE_VIEWS_KEY};
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reads one host setting; returns 503 when the host database cannot answer.
#[instrument(skip(state))]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state
        .report()
        .config()
        .get(PAGE_VIEWS_KEY, ShopScope::All)
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
