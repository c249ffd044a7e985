//! Private key validation.

use std::fmt;
use std::str::FromStr;

use secp256k1::SecretKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Number of hex digits in a private key.
const SECRET_HEX_LEN: usize = 64;

/// A validated secp256k1 private key: a big-endian scalar in `[1, n-1]`.
///
/// The bytes are wiped when the value is dropped, and `Debug` never prints
/// them. Use [`Secret::to_hex`] to render the key explicitly.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; 32]);

impl Secret {
    /// Wraps raw bytes, rejecting zero and anything at or above the group order.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        Self::copy_from(&bytes)
    }

    /// Copies borrowed bytes straight into a new `Secret`, leaving no other
    /// copy behind for the caller to wipe.
    pub(crate) fn copy_from(bytes: &[u8; 32]) -> Result<Self> {
        let mut secret = Self([0u8; 32]);
        secret.0.copy_from_slice(bytes);
        secret.check_range()?;
        Ok(secret)
    }

    /// Parses a hex private key.
    ///
    /// Accepts exactly 64 hex digits in any case, with an optional `0x` prefix.
    /// No whitespace is stripped and no value is reduced modulo the order.
    pub fn parse(input: &str) -> Result<Self> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);

        if digits.len() != SECRET_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::MalformedHex);
        }

        let mut secret = Self([0u8; 32]);
        hex::decode_to_slice(digits, &mut secret.0).map_err(|_| Error::MalformedHex)?;
        secret.check_range()?;
        Ok(secret)
    }

    /// Returns the key as `0x` followed by 64 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns the raw scalar bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn check_range(&self) -> Result<()> {
        let mut secret_key = self.to_secret_key()?;
        secret_key.non_secure_erase();
        Ok(())
    }

    /// Converts to a curve scalar, re-checking the range.
    ///
    /// Callers erase the returned key once they are done with it.
    pub(crate) fn to_secret_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.0).map_err(|_| Error::ScalarOutOfRange)
    }
}

/// Validates a hex private key. See [`Secret::parse`].
pub fn validate(input: &str) -> Result<Secret> {
    Secret::parse(input)
}

impl FromStr for Secret {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}
