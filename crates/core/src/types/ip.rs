//! Packed IPv4 address type.
//!
//! The host tracking tables store visitor addresses as a single unsigned
//! 32-bit integer (network byte order read as a number), not as text.

use core::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`PackedIpv4`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IpParseError {
    /// The input string is empty.
    #[error("ip address cannot be empty")]
    Empty,
    /// The input is not a dotted-decimal IPv4 address.
    #[error("invalid dotted-decimal ipv4 address: {0}")]
    Invalid(String),
}

/// An IPv4 address in the packed integer form used by the tracking tables.
///
/// ## Examples
///
/// ```
/// use visitors_online_core::PackedIpv4;
///
/// let ip = PackedIpv4::parse("203.0.113.5").unwrap();
/// assert_eq!(ip.as_u32(), 3_405_803_781);
/// assert_eq!(ip.to_string(), "203.0.113.5");
///
/// assert!(PackedIpv4::parse("not-an-ip").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedIpv4(u32);

impl PackedIpv4 {
    /// Wrap an already packed address.
    #[must_use]
    pub const fn new(packed: u32) -> Self {
        Self(packed)
    }

    /// Parse a dotted-decimal address such as `10.0.0.1`.
    ///
    /// Surrounding whitespace is not accepted; callers trim first.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or is not exactly four
    /// decimal octets in the range 0-255.
    pub fn parse(s: &str) -> Result<Self, IpParseError> {
        if s.is_empty() {
            return Err(IpParseError::Empty);
        }

        s.parse::<Ipv4Addr>()
            .map(Self::from)
            .map_err(|_| IpParseError::Invalid(s.to_owned()))
    }

    /// Convert the value stored in a `BIGINT` column.
    ///
    /// Returns `None` for values that cannot be a packed IPv4 address.
    #[must_use]
    pub fn from_stored(value: i64) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }

    /// Returns the packed integer.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the address as a standard library [`Ipv4Addr`].
    #[must_use]
    pub const fn to_ipv4(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.0)
    }
}

impl From<Ipv4Addr> for PackedIpv4 {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr.to_bits())
    }
}

impl From<PackedIpv4> for i64 {
    fn from(ip: PackedIpv4) -> Self {
        Self::from(ip.0)
    }
}

impl fmt::Display for PackedIpv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ipv4())
    }
}

impl std::str::FromStr for PackedIpv4 {
    type Err = IpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PackedIpv4 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackedIpv4 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature). Stored as BIGINT since the packed
// value does not fit a signed 32-bit column.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PackedIpv4 {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PackedIpv4 {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Self::from_stored(raw).ok_or_else(|| format!("ip_address out of range: {raw}").into())
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PackedIpv4 {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i64::from(*self), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(PackedIpv4::parse("0.0.0.0").unwrap().as_u32(), 0);
        assert_eq!(PackedIpv4::parse("10.0.0.1").unwrap().as_u32(), 167_772_161);
        assert_eq!(
            PackedIpv4::parse("255.255.255.255").unwrap().as_u32(),
            u32::MAX
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PackedIpv4::parse(""), Err(IpParseError::Empty));
    }

    #[test]
    fn test_parse_invalid() {
        for input in [
            "not-an-ip",
            "256.0.0.1",
            "10.0.0",
            "10.0.0.1.5",
            " 10.0.0.1",
            "::1",
        ] {
            assert!(
                matches!(PackedIpv4::parse(input), Err(IpParseError::Invalid(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_is_dotted() {
        assert_eq!(PackedIpv4::new(3_405_803_781).to_string(), "203.0.113.5");
    }

    #[test]
    fn test_from_stored_range() {
        assert_eq!(PackedIpv4::from_stored(-1), None);
        assert_eq!(PackedIpv4::from_stored(i64::from(u32::MAX) + 1), None);
        assert_eq!(
            PackedIpv4::from_stored(167_772_161),
            Some(PackedIpv4::new(167_772_161))
        );
    }

    #[test]
    fn test_serializes_as_dotted_string() {
        let ip = PackedIpv4::parse("192.168.1.20").unwrap();
        let json = serde_json::to_string(&ip).unwrap();
        assert_eq!(json, "\"192.168.1.20\"");

        let parsed: PackedIpv4 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ip);
    }
}
