//! Secure randomness for fresh private keys.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// A source of 32-byte secret candidates.
///
/// Implementations must be backed by a cryptographically secure generator.
/// The handle is shared between batch workers, hence `&self` and `Send + Sync`.
pub trait EntropySource: Send + Sync {
    /// Draws 32 fresh bytes. Fails rather than returning weak or zeroed output.
    fn next_32_bytes(&self) -> Result<Zeroizing<[u8; 32]>>;
}

/// Entropy read straight from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_32_bytes(&self) -> Result<Zeroizing<[u8; 32]>> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        OsRng.try_fill_bytes(&mut bytes[..]).map_err(|err| {
            tracing::error!(error = %err, "operating system RNG failed");
            Error::EntropySourceUnavailable
        })?;
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic entropy doubles.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays a fixed list of draws, then reports the source as unavailable.
    pub struct SequenceEntropy {
        draws: Mutex<VecDeque<[u8; 32]>>,
    }

    impl SequenceEntropy {
        pub fn new(draws: impl IntoIterator<Item = [u8; 32]>) -> Self {
            Self {
                draws: Mutex::new(draws.into_iter().collect()),
            }
        }
    }

    impl EntropySource for SequenceEntropy {
        fn next_32_bytes(&self) -> Result<Zeroizing<[u8; 32]>> {
            let mut draws = self.draws.lock().unwrap();
            draws
                .pop_front()
                .map(Zeroizing::new)
                .ok_or(Error::EntropySourceUnavailable)
        }
    }

    /// Always fails, like a machine with no readable RNG.
    pub struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn next_32_bytes(&self) -> Result<Zeroizing<[u8; 32]>> {
            Err(Error::EntropySourceUnavailable)
        }
    }

    /// Scalar `k` as a big-endian 32-byte array.
    pub fn scalar(k: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = k;
        bytes
    }
}
