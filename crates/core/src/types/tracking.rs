//! Read-only view of the host platform's visitor tracking relations.
//!
//! These rows are written by the storefront's tracking subsystem; this
//! crate never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ConnectionId, CustomerId, GuestId, ShopGroupId, ShopId};
use super::ip::PackedIpv4;

/// One browsing session (a row of the host's `connections` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: ConnectionId,
    pub guest_id: GuestId,
    pub shop_id: ShopId,
    pub shop_group_id: ShopGroupId,
    pub ip_address: Option<PackedIpv4>,
    pub started_at: DateTime<Utc>,
    pub referrer_url: Option<String>,
}

/// Anonymous visitor identity, optionally linked to a customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub customer_id: Option<CustomerId>,
}

/// The parts of a customer account the report shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
}

/// A page viewed within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub session_id: ConnectionId,
    pub page_type_name: Option<String>,
    pub view_started_at: DateTime<Utc>,
    pub view_ended_at: Option<DateTime<Utc>>,
}

impl PageView {
    /// An open view is the session's current page.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.view_ended_at.is_none()
    }
}

/// Multi-store boundary restricting which sessions are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ShopScope {
    /// Every shop of the installation.
    #[default]
    All,
    /// Every shop of one shop group.
    Group(ShopGroupId),
    /// A single shop.
    Shop(ShopId),
}

impl ShopScope {
    /// Whether a session recorded for `shop` / `group` is visible in this scope.
    #[must_use]
    pub fn contains(&self, shop: ShopId, group: ShopGroupId) -> bool {
        match self {
            Self::All => true,
            Self::Group(g) => *g == group,
            Self::Shop(s) => *s == shop,
        }
    }

    /// Shop restriction as bind parameters: `(id_shop, id_shop_group)`.
    #[must_use]
    pub const fn as_filter(&self) -> (Option<i32>, Option<i32>) {
        match self {
            Self::All => (None, None),
            Self::Group(g) => (None, Some(g.as_i32())),
            Self::Shop(s) => (Some(s.as_i32()), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_contains() {
        let shop = ShopId::new(2);
        let group = ShopGroupId::new(1);

        assert!(ShopScope::All.contains(shop, group));
        assert!(ShopScope::Shop(ShopId::new(2)).contains(shop, group));
        assert!(!ShopScope::Shop(ShopId::new(3)).contains(shop, group));
        assert!(ShopScope::Group(ShopGroupId::new(1)).contains(shop, group));
        assert!(!ShopScope::Group(ShopGroupId::new(9)).contains(shop, group));
    }

    #[test]
    fn test_scope_filter() {
        assert_eq!(ShopScope::All.as_filter(), (None, None));
        assert_eq!(ShopScope::Shop(ShopId::new(4)).as_filter(), (Some(4), None));
        assert_eq!(
            ShopScope::Group(ShopGroupId::new(5)).as_filter(),
            (None, Some(5))
        );
    }
}
