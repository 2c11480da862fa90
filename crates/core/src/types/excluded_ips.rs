//! Maintenance IP exclusion set.
//!
//! Operators list their own office or maintenance addresses in a single
//! comma-separated setting so that their traffic is hidden from the live
//! visitors report. The setting is hand-edited, so parsing is tolerant:
//! entries that are not valid dotted-decimal addresses are dropped.

use std::collections::BTreeSet;

use super::ip::PackedIpv4;

/// Set of packed IPv4 addresses hidden from the live report.
///
/// ```
/// use visitors_online_core::{ExcludedIpSet, PackedIpv4};
///
/// let set = ExcludedIpSet::parse("10.0.0.1, 10.0.0.2,not-an-ip");
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(Some(PackedIpv4::parse("10.0.0.2").unwrap())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedIpSet {
    ips: BTreeSet<PackedIpv4>,
}

impl ExcludedIpSet {
    /// An empty set; excludes nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ips: BTreeSet::new(),
        }
    }

    /// Parse the raw comma-separated setting value.
    ///
    /// Never fails. Each entry is trimmed; unparsable entries are skipped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter_map(|entry| PackedIpv4::parse(entry).ok())
            .collect()
    }

    /// Whether a session with this address must be hidden.
    ///
    /// Sessions without a recorded address are never excluded.
    #[must_use]
    pub fn contains(&self, ip: Option<PackedIpv4>) -> bool {
        ip.is_some_and(|ip| self.ips.contains(&ip))
    }

    /// Returns true when no exclusion applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    /// Number of distinct excluded addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ips.len()
    }

    /// Iterate the excluded addresses in ascending packed order.
    pub fn iter(&self) -> impl Iterator<Item = PackedIpv4> + '_ {
        self.ips.iter().copied()
    }
}

impl FromIterator<PackedIpv4> for ExcludedIpSet {
    fn from_iter<I: IntoIterator<Item = PackedIpv4>>(iter: I) -> Self {
        Self {
            ips: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ip(s: &str) -> PackedIpv4 {
        PackedIpv4::parse(s).unwrap()
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let set = ExcludedIpSet::parse("10.0.0.1, 10.0.0.2");
        assert_eq!(set.len(), 2);
        assert!(set.contains(Some(ip("10.0.0.1"))));
        assert!(set.contains(Some(ip("10.0.0.2"))));

        let padded = ExcludedIpSet::parse("  10.0.0.1  ,\t10.0.0.2\n");
        assert_eq!(padded, set);
    }

    #[test]
    fn test_parse_drops_invalid_entries() {
        let set = ExcludedIpSet::parse("not-an-ip,203.0.113.5,999.1.1.1,,");
        assert_eq!(set.len(), 1);
        assert!(set.contains(Some(ip("203.0.113.5"))));
    }

    #[test]
    fn test_parse_never_fails() {
        for raw in ["", ",", " , , ", "garbage", "1.2.3", "::1,fe80::1"] {
            assert!(ExcludedIpSet::parse(raw).is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = ExcludedIpSet::parse("10.0.0.1,10.0.0.1, 10.0.0.1");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_missing_address_is_never_excluded() {
        let set = ExcludedIpSet::parse("0.0.0.0");
        assert!(!set.contains(None));
        assert!(set.contains(Some(PackedIpv4::new(0))));
    }

    #[test]
    fn test_iter_is_sorted() {
        let set = ExcludedIpSet::parse("10.0.0.9,10.0.0.1,10.0.0.5");
        let listed: Vec<String> = set.iter().map(|ip| ip.to_string()).collect();
        assert_eq!(listed, ["10.0.0.1", "10.0.0.5", "10.0.0.9"]);
    }
}
