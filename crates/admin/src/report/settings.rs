//! Settings read on every report request.

use visitors_online_core::ExcludedIpSet;

/// Host flag enabling per-page tracking of customer sessions.
pub const PAGE_VIEWS_KEY: &str = "PS_STATSDATA_CUSTOMER_PAGESVIEWS";

/// Host setting listing maintenance IPs, comma separated.
pub const MAINTENANCE_IP_KEY: &str = "PS_MAINTENANCE_IP";

/// Settings snapshot for one report computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSettings {
    pub page_views_enabled: bool,
    pub excluded_ips: ExcludedIpSet,
}

impl ReportSettings {
    /// Interpret the raw setting values.
    #[must_use]
    pub fn from_values(page_views: Option<&str>, maintenance_ips: Option<&str>) -> Self {
        Self {
            page_views_enabled: parse_flag(page_views),
            excluded_ips: maintenance_ips.map_or_else(ExcludedIpSet::empty, ExcludedIpSet::parse),
        }
    }
}

/// Boolean-like host setting: anything but blank or `0` is on.
#[must_use]
pub fn parse_flag(value: Option<&str>) -> bool {
    value.map(str::trim).is_some_and(|v| !v.is_empty() && v != "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some(" 1 ")));
        assert!(parse_flag(Some("true")));
        assert!(!parse_flag(None));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(Some("0")));
        // Only the host's own falsy values switch it off.
        assert!(parse_flag(Some("false")));
        assert!(parse_flag(Some("off")));
    }

    #[test]
    fn test_from_values() {
        let settings = ReportSettings::from_values(Some("1"), Some("10.0.0.1, bogus"));
        assert!(settings.page_views_enabled);
        assert_eq!(settings.excluded_ips.len(), 1);

        let defaults = ReportSettings::from_values(None, None);
        assert_eq!(defaults, ReportSettings::default());
    }
}
