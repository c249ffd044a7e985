//! Ethereum keypair generation and derivation.

use secp256k1::{PublicKey, SECP256K1};
use tiny_keccak::{Hasher, Keccak};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::{Address, EntropySource, Secret};

/// Consecutive out-of-range draws tolerated before the entropy source is
/// considered broken. A healthy source rejects a draw with probability ~2^-128.
pub const MAX_REDRAWS: usize = 16;

/// An Ethereum keypair (private key + derived address).
///
/// The public key is an intermediate of derivation and is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: Secret,
    address: Address,
}

impl KeyPair {
    /// Generates a new keypair from fresh entropy.
    ///
    /// Draws that fall outside `[1, n-1]` are discarded and redrawn, never reduced.
    pub fn generate<E: EntropySource + ?Sized>(entropy: &E) -> Result<Self> {
        for attempt in 0..MAX_REDRAWS {
            let bytes = entropy.next_32_bytes()?;
            match Secret::copy_from(&bytes) {
                Ok(secret) => return Self::from_secret(secret),
                Err(Error::ScalarOutOfRange) => {
                    debug!(attempt, "entropy draw outside curve order, redrawing");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            attempts = MAX_REDRAWS,
            "entropy source keeps producing invalid scalars"
        );
        Err(Error::EntropySourceUnavailable)
    }

    /// Derives the keypair for an existing secret.
    pub fn derive(secret: &Secret) -> Result<Self> {
        Self::from_secret(secret.clone())
    }

    /// Derives the keypair for raw secret bytes.
    pub fn from_bytes(secret_bytes: [u8; 32]) -> Result<Self> {
        Self::from_secret(Secret::from_bytes(secret_bytes)?)
    }

    fn from_secret(secret: Secret) -> Result<Self> {
        let mut secret_key = secret.to_secret_key()?;
        let public_key = PublicKey::from_secret_key(SECP256K1, &secret_key);
        secret_key.non_secure_erase();

        let address = Self::derive_address(&public_key);
        tracing::trace!(%address, "derived address");

        Ok(Self { secret, address })
    }

    /// Derives an Ethereum address from a secp256k1 public key.
    ///
    /// Process:
    /// 1. Serialize the public key in uncompressed form (65 bytes)
    /// 2. Remove the first byte (0x04 prefix)
    /// 3. Hash the remaining 64 bytes with Keccak-256
    /// 4. Take the last 20 bytes of the hash
    #[inline]
    fn derive_address(public_key: &PublicKey) -> Address {
        let public_key_bytes = public_key.serialize_uncompressed();

        let mut hasher = Keccak::v256();
        hasher.update(&public_key_bytes[1..]);

        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&hash[12..]);

        Address::from_bytes(address_bytes)
    }

    /// Returns the private key.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Returns the private key as `0x` + 64 lowercase hex digits.
    pub fn private_key_hex(&self) -> String {
        self.secret.to_hex()
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::{scalar, BrokenEntropy, SequenceEntropy};
    use crate::crypto::OsEntropy;

    const GENERATOR_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    #[test]
    fn test_keypair_generation() {
        let keypair = KeyPair::generate(&OsEntropy).unwrap();
        assert_eq!(keypair.private_key_hex().len(), 66);
        assert_eq!(KeyPair::derive(keypair.secret()).unwrap(), keypair);
    }

    #[test]
    fn test_deterministic_address() {
        let secret = Secret::parse(&format!("0x{}1", "0".repeat(63))).unwrap();
        let keypair = KeyPair::derive(&secret).unwrap();

        // Address for private key = 1 is well-known
        assert_eq!(keypair.address().to_checksum(), GENERATOR_ADDRESS);
        assert_eq!(
            keypair.private_key_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_known_vector_two() {
        let keypair = KeyPair::from_bytes(scalar(2)).unwrap();
        assert_eq!(
            keypair.address().to_checksum(),
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF"
        );
    }

    #[test]
    fn test_derive_is_repeatable() {
        let secret = Secret::from_bytes([0x42; 32]).unwrap();
        let first = KeyPair::derive(&secret).unwrap();
        for _ in 0..10 {
            assert_eq!(KeyPair::derive(&secret).unwrap().address(), first.address());
        }
    }

    #[test]
    fn test_from_bytes_rejects_zero() {
        assert!(matches!(
            KeyPair::from_bytes([0u8; 32]),
            Err(Error::ScalarOutOfRange)
        ));
    }

    #[test]
    fn test_generate_redraws_out_of_range() {
        let entropy = SequenceEntropy::new([[0u8; 32], [0xff; 32], scalar(1)]);
        let keypair = KeyPair::generate(&entropy).unwrap();
        assert_eq!(keypair.address().to_checksum(), GENERATOR_ADDRESS);
    }

    #[test]
    fn test_generate_gives_up_on_degenerate_source() {
        let entropy = SequenceEntropy::new(std::iter::repeat([0u8; 32]).take(MAX_REDRAWS + 1));
        assert!(matches!(
            KeyPair::generate(&entropy),
            Err(Error::EntropySourceUnavailable)
        ));
    }

    #[test]
    fn test_generate_propagates_entropy_failure() {
        assert!(matches!(
            KeyPair::generate(&BrokenEntropy),
            Err(Error::EntropySourceUnavailable)
        ));
    }
}
