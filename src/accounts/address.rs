//! 32-byte account addresses in the chain's hex-literal convention.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error produced when parsing an account address from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid account address '{input}': {reason}")]
pub struct AddressParseError {
    pub input: String,
    pub reason: String,
}

/// A fixed-length on-chain account address.
///
/// Parsed from a `0x`-prefixed hex literal of 1..=64 digits; shorter
/// literals are left-padded with zeros, matching the chain convention
/// where `0x1` names the framework address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    /// The framework address `0x1`.
    pub const ONE: AccountAddress = {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        AccountAddress(bytes)
    };

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed hex literal, left-padding short forms.
    pub fn from_hex_literal(input: &str) -> Result<Self, AddressParseError> {
        let err = |reason: &str| AddressParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let digits = input
            .strip_prefix("0x")
            .ok_or_else(|| err("missing 0x prefix"))?;
        if digits.is_empty() {
            return Err(err("no hex digits after 0x"));
        }
        if digits.len() > Self::LENGTH * 2 {
            return Err(err("longer than 32 bytes"));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err("non-hex character"));
        }

        // Left-pad to the full width before decoding.
        let padded = format!("{digits:0>64}");
        let raw = hex::decode(&padded).map_err(|e| err(&e.to_string()))?;
        let mut bytes = [0u8; Self::LENGTH];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Short literal with leading zeros trimmed, e.g. `0x1`.
    pub fn to_hex_literal(&self) -> String {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// Debug delegates to Display so logs show the canonical hex form.
impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_literal(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_literal_with_padding() {
        let addr = AccountAddress::from_hex_literal("0x1").unwrap();
        assert_eq!(addr.as_bytes()[31], 1);
        assert_eq!(addr.as_bytes()[..31], [0u8; 31]);
        assert_eq!(addr.to_hex_literal(), "0x1");
    }

    #[test]
    fn parses_full_width_literal() {
        let hex64 = "8ede5b689d5ac487c3ee48ceabe28ae061be74071c86ffe523b7f42acda2fcb7";
        let addr = AccountAddress::from_hex_literal(&format!("0x{hex64}")).unwrap();
        assert_eq!(addr.to_string(), format!("0x{hex64}"));
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = AccountAddress::from_hex_literal("1234").unwrap_err();
        assert!(err.reason.contains("0x prefix"));
    }

    #[test]
    fn rejects_overlong_and_non_hex() {
        let overlong = format!("0x{}", "a".repeat(65));
        assert!(AccountAddress::from_hex_literal(&overlong).is_err());
        assert!(AccountAddress::from_hex_literal("0xzz").is_err());
    }

    #[test]
    fn zero_address_literal() {
        let addr = AccountAddress::new([0u8; 32]);
        assert_eq!(addr.to_hex_literal(), "0x0");
    }
}
