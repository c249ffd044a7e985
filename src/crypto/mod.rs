//! Cryptographic operations for Ethereum account generation.
//!
//! This module provides:
//! - A pluggable secure entropy source
//! - Private key validation against the secp256k1 group order
//! - Ethereum address derivation using Keccak-256
//! - EIP-55 checksum encoding

mod address;
mod entropy;
mod keypair;
mod secret;

pub use address::{checksum, Address};
pub use entropy::{EntropySource, OsEntropy};
pub use keypair::{KeyPair, MAX_REDRAWS};
pub use secret::{validate, Secret};

#[cfg(test)]
pub(crate) use entropy::testing;
