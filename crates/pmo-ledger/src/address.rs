//! 20-byte account/contract addresses.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque 20-byte identifier for an account or contract.
///
/// Role bindings must never point at [`Address::ZERO`]; callers are expected
/// to check [`Address::is_zero`] before trusting a resolved address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse an address from hex, with or without a `0x` prefix.
    ///
    /// # Errors
    /// [`AddressParseError`] if the input is not exactly 40 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 40 {
            return Err(AddressParseError::Length { found: digits.len() });
        }
        let raw = hex::decode(digits).map_err(|_| AddressParseError::InvalidHex)?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Whether this is the null address.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes of the address.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Failure to parse an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Wrong number of hex digits.
    #[error("expected 40 hex digits, found {found}")]
    Length {
        /// Digits found after stripping any `0x` prefix.
        found: usize,
    },

    /// Non-hex characters in the input.
    #[error("invalid hex digits")]
    InvalidHex,
}
