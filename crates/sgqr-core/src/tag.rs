//! Two-digit element tags

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;

/// Element identifier: exactly two ASCII digits.
///
/// Ordering is lexicographic on the two digits, which for zero-padded tags is
/// the same as numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag([u8; 2]);

impl Tag {
    /// First tag of the merchant account information range.
    pub const MERCHANT_ACCOUNT_FIRST: Tag = Tag(*b"26");
    /// Last tag of the merchant account information range.
    pub const MERCHANT_ACCOUNT_LAST: Tag = Tag(*b"51");
    /// Checksum trailer.
    pub const CRC: Tag = Tag(*b"63");

    /// Tag for a constant in `0..=99`, for use in `const` items.
    ///
    /// # Panics
    ///
    /// Panics if `n > 99`. Use [`Tag::from_number`] for unchecked input.
    pub const fn new(n: u8) -> Self {
        assert!(n <= 99, "tags have two digits");
        Tag([b'0' + n / 10, b'0' + n % 10])
    }

    /// Builds a tag from a number in `0..=99`.
    pub fn from_number(n: u8) -> Option<Self> {
        (n <= 99).then(|| Tag::new(n))
    }

    /// Parses a tag, returning `None` unless `s` is exactly two ASCII digits.
    pub fn parse(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => Some(Tag([*a, *b])),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII digits by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    pub fn number(&self) -> u8 {
        (self.0[0] - b'0') * 10 + (self.0[1] - b'0')
    }

    /// Whether the tag falls in the reserved `26..=51` merchant account range.
    pub fn is_merchant_account(&self) -> bool {
        (Self::MERCHANT_ACCOUNT_FIRST..=Self::MERCHANT_ACCOUNT_LAST).contains(self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::parse(s).ok_or_else(|| EncodeError::InvalidTag(s.to_string()))
    }
}

impl TryFrom<&str> for Tag {
    type Error = EncodeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_two_digits() {
        assert_eq!(Tag::parse("26").map(|t| t.number()), Some(26));
        assert!(Tag::parse("2").is_none());
        assert!(Tag::parse("260").is_none());
        assert!(Tag::parse("2a").is_none());
        assert!(Tag::parse("٢٦").is_none());
        assert_eq!(
            "x1".parse::<Tag>(),
            Err(EncodeError::InvalidTag("x1".to_string()))
        );
    }

    #[test]
    fn test_merchant_account_range() {
        assert!(!Tag::parse("25").unwrap().is_merchant_account());
        assert!(Tag::parse("26").unwrap().is_merchant_account());
        assert!(Tag::parse("51").unwrap().is_merchant_account());
        assert!(!Tag::parse("52").unwrap().is_merchant_account());
    }

    #[test]
    fn test_from_number_pads() {
        assert_eq!(Tag::from_number(4).unwrap().as_str(), "04");
        assert_eq!(Tag::from_number(99).unwrap().as_str(), "99");
        assert!(Tag::from_number(100).is_none());
    }

    #[test]
    fn test_new_matches_from_number() {
        const PAYEE: Tag = Tag::new(2);
        assert_eq!(Some(PAYEE), Tag::from_number(2));
        assert_eq!(Tag::new(51), Tag::MERCHANT_ACCOUNT_LAST);
    }

    #[test]
    #[should_panic(expected = "tags have two digits")]
    fn test_new_rejects_three_digits() {
        let _ = Tag::new(100);
    }
}
