//! Core types for the live visitors report.
//!
//! This module provides type-safe wrappers for the host tracking data and
//! the report rows derived from it.

pub mod entry;
pub mod excluded_ips;
pub mod id;
pub mod ip;
pub mod page;
pub mod referrer;
pub mod tracking;

pub use entry::{CustomerOnlineEntry, VisitorOnlineEntry};
pub use excluded_ips::ExcludedIpSet;
pub use id::*;
pub use ip::{IpParseError, PackedIpv4};
pub use page::{CurrentPage, UNKNOWN_PAGE};
pub use referrer::{NO_REFERRER, ReferrerHost};
pub use tracking::{CustomerProfile, Guest, PageView, Session, ShopScope};
