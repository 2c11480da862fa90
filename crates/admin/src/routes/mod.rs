//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (host settings readable)
//!
//! # Live visitors
//! GET  /stats/live             - Customers and visitors online right now
//!      ?shop=ID                  restrict to one shop
//!      ?shop_group=ID            restrict to one shop group
//! ```

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod health;
pub mod live;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Live visitors
        .route("/stats/live", get(live::show))
}
