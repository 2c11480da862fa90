//! Rows of the live visitors report.
//!
//! Both entry types are projections recomputed on every request.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::{ConnectionId, CustomerId, GuestId};
use super::ip::PackedIpv4;
use super::page::CurrentPage;
use super::referrer::ReferrerHost;

/// A signed-in customer with at least one live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOnlineEntry {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub current_page: CurrentPage,
}

/// An anonymous visitor session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorOnlineEntry {
    pub connection_id: ConnectionId,
    pub guest_id: GuestId,
    pub ip_address: Option<PackedIpv4>,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub current_page: CurrentPage,
    pub referrer_host: ReferrerHost,
}

impl VisitorOnlineEntry {
    /// Time of day of the last activity, `HH:MM:SS`.
    #[must_use]
    pub fn last_activity_clock(&self) -> String {
        self.last_activity_at.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_last_activity_clock() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap();
        let entry = VisitorOnlineEntry {
            connection_id: ConnectionId::new(1),
            guest_id: GuestId::new(1),
            ip_address: None,
            started_at: at,
            last_activity_at: at,
            current_page: CurrentPage::Unknown,
            referrer_host: ReferrerHost::None,
        };
        assert_eq!(entry.last_activity_clock(), "08:05:09");
    }
}
