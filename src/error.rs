//! Error types shared by the key generation engine.
//!
//! No variant carries key material: a rejected secret is never echoed back.

/// Errors produced while validating input or generating accounts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input is not `0x`-optional followed by exactly 64 hex digits.
    #[error("private key must be 64 hex characters, optionally prefixed with 0x")]
    MalformedHex,

    /// Scalar is zero or not below the secp256k1 group order.
    #[error("private key is outside the valid secp256k1 range [1, n-1]")]
    ScalarOutOfRange,

    #[error("batch size {count} is out of range (1..={max})", max = crate::batch::MAX_BATCH_SIZE)]
    CountOutOfRange { count: usize },

    /// The secure random source could not be read. Never recovered from.
    #[error("secure random source unavailable")]
    EntropySourceUnavailable,

    #[error("address must be 40 hex characters, optionally prefixed with 0x")]
    MalformedAddress,

    #[error("address checksum does not match its mixed-case encoding")]
    ChecksumMismatch,

    #[error("generation cancelled")]
    Cancelled,

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("worker pool exited before the batch completed")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
