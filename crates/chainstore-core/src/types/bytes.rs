use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// HexParseError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum HexParseError {
    #[error("hex literal must start with 0x")]
    MissingPrefix,

    #[error("invalid hex digits: {0}")]
    InvalidDigits(#[from] hex::FromHexError),
}

///
/// Hex
///
/// Byte string written as `0x`-prefixed hex (addresses, hashes, calldata).
/// Text form is always lowercase; odd digit counts are left-padded.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Hex(Vec<u8>);

impl Hex {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Hex {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(HexParseError::MissingPrefix)?;

        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{digits}"))?
        } else {
            hex::decode(digits)?
        };

        Ok(Self(bytes))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Vec<u8>> for Hex {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for Hex {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case() {
        let upper: Hex = "0xABCDEF".parse().unwrap();
        let lower: Hex = "0xabcdef".parse().unwrap();

        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "0xabcdef");
    }

    #[test]
    fn odd_digit_count_is_left_padded() {
        let hex: Hex = "0xfff".parse().unwrap();
        assert_eq!(hex.as_bytes(), &[0x0f, 0xff]);
    }

    #[test]
    fn prefix_is_required() {
        assert_eq!("abcd".parse::<Hex>(), Err(HexParseError::MissingPrefix));
        assert!(matches!(
            "0xzz".parse::<Hex>(),
            Err(HexParseError::InvalidDigits(_))
        ));
    }

    #[test]
    fn empty_payload_is_valid() {
        let hex: Hex = "0x".parse().unwrap();
        assert!(hex.is_empty());
        assert_eq!(hex.to_string(), "0x");
    }
}
