//! Live visitors endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use visitors_online_core::{ShopGroupId, ShopId, ShopScope};

use crate::error::AppError;
use crate::report::PresenceSnapshot;
use crate::state::AppState;

/// Query parameters for `/stats/live`.
#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
    pub shop: Option<i32>,
    pub shop_group: Option<i32>,
}

impl LiveQuery {
    /// Resolve the requested shop scope.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when both a shop and a group are given.
    pub fn scope(&self) -> Result<ShopScope, AppError> {
        match (self.shop, self.shop_group) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "pass either shop or shop_group, not both".to_string(),
            )),
            (Some(shop), None) => Ok(ShopScope::Shop(ShopId::new(shop))),
            (None, Some(group)) => Ok(ShopScope::Group(ShopGroupId::new(group))),
            (None, None) => Ok(ShopScope::All),
        }
    }
}

/// Customers and visitors currently online.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> Result<Json<PresenceSnapshot>, AppError> {
    let scope = query.scope()?;
    let snapshot = state.report().snapshot(Utc::now(), scope).await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::Duration;
    use serde_json::Value;
    use tower::ServiceExt;

    use visitors_online_core::{
        ConnectionId, CustomerId, CustomerProfile, Guest, GuestId, PackedIpv4, Session,
    };

    use super::*;
    use crate::report::{InMemorySessionStore, MAINTENANCE_IP_KEY, StaticConfigProvider};
    use crate::routes::routes;

    fn session(id: i32, guest: i32, shop: i32, ip: &str) -> Session {
        Session {
            id: ConnectionId::new(id),
            guest_id: GuestId::new(guest),
            shop_id: ShopId::new(shop),
            shop_group_id: ShopGroupId::new(1),
            ip_address: Some(PackedIpv4::parse(ip).unwrap()),
            started_at: Utc::now() - Duration::minutes(2),
            referrer_url: Some("https://www.example.com/search?q=tea".to_string()),
        }
    }

    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new()
            .with_customer(CustomerProfile {
                id: CustomerId::new(7),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .with_guest(Guest {
                id: GuestId::new(1),
                customer_id: Some(CustomerId::new(7)),
            })
            .with_guest(Guest {
                id: GuestId::new(2),
                customer_id: None,
            })
            .with_guest(Guest {
                id: GuestId::new(3),
                customer_id: None,
            })
            .with_session(session(10, 1, 1, "198.51.100.1"))
            .with_session(session(11, 2, 1, "198.51.100.2"))
            .with_session(session(12, 3, 2, "10.0.0.1"))
    }

    fn app(store: InMemorySessionStore) -> axum::Router {
        let config = StaticConfigProvider::new().with(MAINTENANCE_IP_KEY, "10.0.0.1");
        routes().with_state(AppState::with_collaborators(store, config))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[test]
    fn test_live_query_scope() {
        assert_eq!(LiveQuery::default().scope().unwrap(), ShopScope::All);
        let shop = LiveQuery {
            shop: Some(3),
            shop_group: None,
        };
        assert_eq!(shop.scope().unwrap(), ShopScope::Shop(ShopId::new(3)));
        let both = LiveQuery {
            shop: Some(3),
            shop_group: Some(1),
        };
        assert!(matches!(both.scope(), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_live_returns_snapshot() {
        let (status, body) = get(app(store()), "/stats/live").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["customers"]["total_count"], 1);
        assert_eq!(json["customers"]["entries"][0]["first_name"], "Ada");
        // The maintenance address is hidden.
        assert_eq!(json["visitors"]["total_count"], 1);
        assert_eq!(json["visitors"]["entries"][0]["connection_id"], 11);
        assert_eq!(json["visitors"]["entries"][0]["referrer_host"], "www.example.com");
        assert_eq!(json["excluded_ip_count"], 1);
    }

    #[tokio::test]
    async fn test_live_filters_by_shop() {
        let (status, body) = get(app(store()), "/stats/live?shop=2").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["customers"]["total_count"], 0);
        assert_eq!(json["visitors"]["total_count"], 0);
    }

    #[tokio::test]
    async fn test_live_rejects_conflicting_scope() {
        let (status, _) = get(app(store()), "/stats/live?shop=1&shop_group=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_live_store_failure_is_unavailable() {
        let (status, body) = get(app(store().failing("connection reset")), "/stats/live").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(String::from_utf8(body).unwrap().contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn test_readiness() {
        let (status, _) = get(app(store()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);

        let broken = routes().with_state(AppState::with_collaborators(
            store(),
            StaticConfigProvider::new().failing("timeout"),
        ));
        let (status, _) = get(broken, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
