//! Fixtures for the live visitors integration tests.
//!
//! Builds in-memory tracking data shaped like the host tables, so the
//! scenarios run without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p visitors-online-integration-tests
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};

use visitors_online_admin::report::{
    InMemorySessionStore, MAINTENANCE_IP_KEY, OnlinePresenceReport, PAGE_VIEWS_KEY,
    StaticConfigProvider,
};
use visitors_online_core::{
    ConnectionId, CustomerId, CustomerProfile, Guest, GuestId, PackedIpv4, PageView, Session,
    ShopGroupId, ShopId,
};

/// Report over in-memory collaborators.
pub type MemoryReport = OnlinePresenceReport<InMemorySessionStore, StaticConfigProvider>;

/// Fixed reference instant for every scenario.
///
/// # Panics
///
/// Never; the timestamp is a valid constant.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).single().unwrap()
}

/// `now()` minus the given number of seconds.
#[must_use]
pub fn seconds_ago(seconds: i64) -> DateTime<Utc> {
    now() - Duration::seconds(seconds)
}

/// `now()` minus the given number of minutes.
#[must_use]
pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    now() - Duration::minutes(minutes)
}

/// A customer account.
#[must_use]
pub fn customer(id: i32, first_name: &str, last_name: &str) -> CustomerProfile {
    CustomerProfile {
        id: CustomerId::new(id),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

/// A guest identity, optionally linked to a customer.
#[must_use]
pub fn guest(id: i32, customer_id: Option<i32>) -> Guest {
    Guest {
        id: GuestId::new(id),
        customer_id: CustomerId::from_link(customer_id),
    }
}

/// Start building a session of `guest_id` in shop 1, group 1.
#[must_use]
pub fn session(id: i32, guest_id: i32) -> SessionBuilder {
    SessionBuilder(Session {
        id: ConnectionId::new(id),
        guest_id: GuestId::new(guest_id),
        shop_id: ShopId::new(1),
        shop_group_id: ShopGroupId::new(1),
        ip_address: None,
        started_at: minutes_ago(1),
        referrer_url: None,
    })
}

/// Builder for [`Session`] fixtures.
#[derive(Debug, Clone)]
#[must_use]
pub struct SessionBuilder(Session);

impl SessionBuilder {
    pub const fn started(mut self, at: DateTime<Utc>) -> Self {
        self.0.started_at = at;
        self
    }

    /// # Panics
    ///
    /// Panics if `ip` is not a dotted-decimal IPv4 address.
    #[allow(clippy::unwrap_used)]
    pub fn ip(mut self, ip: &str) -> Self {
        self.0.ip_address = Some(PackedIpv4::parse(ip).unwrap());
        self
    }

    pub fn referrer(mut self, url: &str) -> Self {
        self.0.referrer_url = Some(url.to_string());
        self
    }

    pub const fn shop(mut self, shop: i32, group: i32) -> Self {
        self.0.shop_id = ShopId::new(shop);
        self.0.shop_group_id = ShopGroupId::new(group);
        self
    }

    #[must_use]
    pub fn build(self) -> Session {
        self.0
    }
}

/// A page view still in progress.
#[must_use]
pub fn open_view(session_id: i32, page: Option<&str>, started: DateTime<Utc>) -> PageView {
    PageView {
        session_id: ConnectionId::new(session_id),
        page_type_name: page.map(str::to_string),
        view_started_at: started,
        view_ended_at: None,
    }
}

/// A page view the visitor already left.
#[must_use]
pub fn closed_view(session_id: i32, page: &str, started: DateTime<Utc>) -> PageView {
    PageView {
        view_ended_at: Some(started + Duration::seconds(30)),
        ..open_view(session_id, Some(page), started)
    }
}

/// Host settings for the two report switches.
#[must_use]
pub fn settings(page_views_enabled: bool, maintenance_ips: &str) -> StaticConfigProvider {
    StaticConfigProvider::new()
        .with(PAGE_VIEWS_KEY, if page_views_enabled { "1" } else { "0" })
        .with(MAINTENANCE_IP_KEY, maintenance_ips)
}

/// A small shop with a mix of customers, visitors and maintenance traffic.
///
/// - Ada (customer 1) browses in two tabs: sessions 10 and 11.
/// - Grace (customer 2) has one session, 12.
/// - Guests 3 and 4 are anonymous; guest 4 has two sessions, 14 and 15.
/// - Guest 5 is the shop owner browsing from the office IP 203.0.113.5.
/// - Guest 6 left 20 minutes ago.
#[must_use]
pub fn busy_shop() -> InMemorySessionStore {
    InMemorySessionStore::new()
        .with_customer(customer(1, "Ada", "Lovelace"))
        .with_customer(customer(2, "Grace", "Hopper"))
        .with_guest(guest(1, Some(1)))
        .with_guest(guest(2, Some(2)))
        .with_guest(guest(3, None))
        .with_guest(guest(4, None))
        .with_guest(guest(5, None))
        .with_guest(guest(6, None))
        .with_session(session(10, 1).started(minutes_ago(10)).ip("198.51.100.1").build())
        .with_session(session(11, 1).started(minutes_ago(3)).ip("198.51.100.1").build())
        .with_session(session(12, 2).started(minutes_ago(5)).ip("198.51.100.2").build())
        .with_session(
            session(13, 3)
                .started(minutes_ago(2))
                .ip("198.51.100.3")
                .referrer("https://example.com/search?q=x")
                .build(),
        )
        .with_session(
            session(14, 4)
                .started(minutes_ago(8))
                .ip("198.51.100.4")
                .referrer("")
                .build(),
        )
        .with_session(session(15, 4).started(minutes_ago(4)).ip("198.51.100.4").build())
        .with_session(session(16, 5).started(minutes_ago(1)).ip("203.0.113.5").build())
        .with_session(session(17, 6).started(minutes_ago(20)).ip("198.51.100.6").build())
        .with_page_view(open_view(10, Some("category"), minutes_ago(9)))
        .with_page_view(open_view(11, Some("product"), minutes_ago(2)))
        .with_page_view(closed_view(12, "index", minutes_ago(5)))
        .with_page_view(open_view(12, Some("cart"), minutes_ago(4)))
        .with_page_view(open_view(13, None, minutes_ago(1)))
        .with_page_view(open_view(15, Some("checkout"), minutes_ago(3)))
        .with_page_view(open_view(16, Some("index"), minutes_ago(1)))
}

/// [`busy_shop`] wired to the given settings.
#[must_use]
pub fn busy_report(page_views_enabled: bool, maintenance_ips: &str) -> MemoryReport {
    OnlinePresenceReport::new(busy_shop(), settings(page_views_enabled, maintenance_ips))
}
