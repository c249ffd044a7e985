//! # eth_keygen
//!
//! Ethereum account generation: fresh or user-supplied secp256k1 secrets,
//! Keccak-256 address derivation and EIP-55 checksum encoding.
//!
//! ## Architecture
//!
//! - `crypto`: Entropy, secret validation, key derivation and address encoding
//! - `batch`: Bounded batch generation, sequential or on a worker pool
//! - `engine`: String-in/string-out boundary used by front ends
//! - `config`: Command line configuration

pub mod batch;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;

pub use batch::{generate_batch, BatchMode, BatchRequest, WorkerPool, MAX_BATCH_SIZE};
pub use config::Config;
pub use crypto::{checksum, validate, Address, EntropySource, KeyPair, OsEntropy, Secret};
pub use engine::{Account, Engine};
pub use error::{Error, Result};
