//! Referrer host extraction.

use core::fmt;

use serde::{Serialize, Serializer};
use url::Url;

/// Label shown when a session arrived without a referrer.
pub const NO_REFERRER: &str = "none";

/// Host part of the URL a visitor came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferrerHost {
    /// Direct visit, the referrer column was empty.
    None,
    /// Host name of the referrer. Empty when the URL could not be parsed
    /// or carries no host.
    Host(String),
}

impl ReferrerHost {
    /// Derive the referrer host from the raw `http_referer` value.
    ///
    /// Scheme, port, path, query and fragment are dropped. A malformed URL
    /// yields an empty host, never an error.
    ///
    /// ```
    /// use visitors_online_core::ReferrerHost;
    ///
    /// let host = ReferrerHost::from_referrer(Some("https://example.com/search?q=x"));
    /// assert_eq!(host.as_str(), "example.com");
    /// assert_eq!(ReferrerHost::from_referrer(Some("")).as_str(), "none");
    /// ```
    #[must_use]
    pub fn from_referrer(referrer: Option<&str>) -> Self {
        let Some(raw) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::None;
        };

        // Scheme-relative referrers (`//host/path`) still name a host.
        let parsed = match raw.strip_prefix("//") {
            Some(rest) => Url::parse(&format!("http://{rest}")),
            None => Url::parse(raw),
        };
        let host = parsed
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .unwrap_or_default();
        Self::Host(host)
    }

    /// Returns the host, or `none` for direct visits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => NO_REFERRER,
            Self::Host(host) => host,
        }
    }
}

impl fmt::Display for ReferrerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReferrerHost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_extracted() {
        let host = ReferrerHost::from_referrer(Some("https://example.com/search?q=x"));
        assert_eq!(host, ReferrerHost::Host("example.com".to_string()));
    }

    #[test]
    fn test_port_and_credentials_dropped() {
        let host = ReferrerHost::from_referrer(Some("http://user:pw@shop.example.org:8080/a#b"));
        assert_eq!(host.as_str(), "shop.example.org");
    }

    #[test]
    fn test_scheme_relative_referrer() {
        let host = ReferrerHost::from_referrer(Some("//example.com/x"));
        assert_eq!(host, ReferrerHost::Host("example.com".to_string()));
        assert_eq!(ReferrerHost::from_referrer(Some("//")).as_str(), "");
    }

    #[test]
    fn test_empty_or_missing_is_none() {
        assert_eq!(ReferrerHost::from_referrer(None), ReferrerHost::None);
        assert_eq!(ReferrerHost::from_referrer(Some("")), ReferrerHost::None);
        assert_eq!(ReferrerHost::from_referrer(Some("   ")), ReferrerHost::None);
        assert_eq!(ReferrerHost::None.to_string(), "none");
    }

    #[test]
    fn test_malformed_yields_empty_host() {
        for raw in ["not a url", "example.com/path", "http://", "mailto:someone@example.com"] {
            assert_eq!(
                ReferrerHost::from_referrer(Some(raw)),
                ReferrerHost::Host(String::new()),
                "{raw}"
            );
        }
    }
}
