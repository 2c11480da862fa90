//! Current page of a browsing session.

use core::fmt;

use serde::{Serialize, Serializer};

/// Sentinel shown when the current page is not known.
pub const UNKNOWN_PAGE: &str = "-";

/// The page a visitor is currently looking at.
///
/// Only known when per-page tracking is enabled and the open page view
/// resolved to a named page type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CurrentPage {
    /// Page type name, e.g. `product` or `order`.
    Named(String),
    /// Tracking disabled or page type unresolved.
    #[default]
    Unknown,
}

impl CurrentPage {
    /// Build from an optional page type name; blank names are unknown.
    #[must_use]
    pub fn from_page_type(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.trim().is_empty() => Self::Named(name),
            _ => Self::Unknown,
        }
    }

    /// Returns the page name or the `-` sentinel.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Unknown => UNKNOWN_PAGE,
        }
    }

    /// Returns true for the unknown sentinel.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for CurrentPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CurrentPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
