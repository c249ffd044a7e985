//! Ethereum address representation and EIP-55 checksum encoding.

use std::fmt;
use std::str::FromStr;

use tiny_keccak::{Hasher, Keccak};

use crate::error::{Error, Result};

/// An Ethereum address (20 bytes).
///
/// Equality and hashing use the raw bytes; checksum casing is display only.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the address as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the address with checksum encoding (EIP-55) and 0x prefix.
    pub fn to_checksum(&self) -> String {
        format!("0x{}", checksum(&self.0))
    }

    /// Parses an address and, if it is mixed case, verifies the EIP-55 casing.
    ///
    /// All-lowercase and all-uppercase inputs carry no checksum and are accepted.
    pub fn parse_checksummed(s: &str) -> Result<Self> {
        let address: Address = s.parse()?;
        let digits = strip_hex_prefix(s);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && digits != checksum(&address.0) {
            return Err(Error::ChecksumMismatch);
        }

        Ok(address)
    }
}

/// Applies EIP-55 mixed-case encoding to a raw address.
///
/// Returns 40 hex digits without prefix. A letter is uppercased when the
/// matching nibble of `keccak256(lowercase_hex)` is 8 or more.
pub fn checksum(raw: &[u8; 20]) -> String {
    let hex_addr = hex::encode(raw);

    let mut hasher = Keccak::v256();
    hasher.update(hex_addr.as_bytes());
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    hex_addr
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if hash_nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

impl FromStr for Address {
    type Err = Error;

    /// Case-insensitive parse; casing is not checked.
    fn from_str(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s);
        if digits.len() != 40 {
            return Err(Error::MalformedAddress);
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| Error::MalformedAddress)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_checksum_address() {
        // Test vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            assert_eq!(parse(expected).to_checksum(), expected);
        }
    }

    #[test]
    fn test_checksum_has_no_prefix() {
        let addr = parse("7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(
            checksum(addr.as_bytes()),
            "7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_hex_output() {
        let bytes = [0u8; 20];
        let addr = Address::from_bytes(bytes);
        assert_eq!(addr.to_hex(), "0000000000000000000000000000000000000000");
        assert_eq!(
            addr.to_checksum(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_equality_ignores_case() {
        let lower = parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        let mixed = parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_malformed_address() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(Error::MalformedAddress)
        ));
        assert!(matches!(
            format!("0x{}", "z".repeat(40)).parse::<Address>(),
            Err(Error::MalformedAddress)
        ));
    }

    #[test]
    fn test_parse_checksummed() {
        let good = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(Address::parse_checksummed(good).is_ok());
        assert!(Address::parse_checksummed(&good.to_lowercase()).is_ok());
        assert!(Address::parse_checksummed(&good[2..].to_uppercase()).is_ok());

        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(
            Address::parse_checksummed(bad),
            Err(Error::ChecksumMismatch)
        ));
    }

    proptest! {
        #[test]
        fn checksum_round_trips(bytes in any::<[u8; 20]>()) {
            let addr = Address::from_bytes(bytes);
            let encoded = addr.to_checksum();
            prop_assert_eq!(encoded.len(), 42);

            let parsed: Address = encoded.parse().unwrap();
            prop_assert_eq!(parsed.as_bytes(), &bytes);
            prop_assert_eq!(parsed.to_checksum(), encoded.clone());
            prop_assert!(Address::parse_checksummed(&encoded).is_ok());
        }
    }
}
