//! String boundary consumed by front ends.
//!
//! Every value crossing this boundary is a `0x`-prefixed hex string: 64 lowercase
//! digits for private keys, 40 EIP-55 checksummed digits for addresses. All
//! bounds are checked here regardless of what the caller already validated.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::batch::{generate_batch_cancellable, BatchMode, BatchRequest};
use crate::crypto::{EntropySource, KeyPair, OsEntropy, Secret};
use crate::error::Result;

/// An account in its interchange form.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    /// `0x` + 64 lowercase hex digits
    pub secret: String,
    /// `0x` + 40 hex digits with checksum casing
    pub address: String,
}

impl From<&KeyPair> for Account {
    fn from(keypair: &KeyPair) -> Self {
        Self {
            secret: keypair.private_key_hex(),
            address: keypair.address().to_checksum(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("secret", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Account generator holding an injected entropy source.
pub struct Engine<E: ?Sized = OsEntropy> {
    entropy: Arc<E>,
    batch_mode: BatchMode,
    stop_flag: Arc<AtomicBool>,
}

impl Engine<OsEntropy> {
    /// Creates an engine backed by the operating system RNG.
    pub fn new() -> Self {
        Self::with_entropy(Arc::new(OsEntropy))
    }
}

impl Default for Engine<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntropySource + ?Sized + 'static> Engine<E> {
    /// Creates an engine drawing from the given source.
    pub fn with_entropy(entropy: Arc<E>) -> Self {
        Self {
            entropy,
            batch_mode: BatchMode::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets how batches are executed.
    pub fn batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    /// Returns the flag that cancels in-flight and future batches once set.
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Generates one account from fresh entropy.
    pub fn generate(&self) -> Result<Account> {
        let keypair = KeyPair::generate(&*self.entropy)?;
        Ok(Account::from(&keypair))
    }

    /// Derives the account for a hex private key.
    pub fn derive(&self, secret_hex: &str) -> Result<Account> {
        let secret = Secret::parse(secret_hex)?;
        let keypair = KeyPair::derive(&secret)?;
        Ok(Account::from(&keypair))
    }

    /// Generates `count` independent accounts, `1 <= count <= 100`.
    pub fn generate_batch(&self, count: usize) -> Result<Vec<Account>> {
        let request = BatchRequest::new(count)?;
        let keypairs =
            generate_batch_cancellable(&request, self.batch_mode, &self.entropy, &self.stop_flag)?;
        Ok(keypairs.iter().map(Account::from).collect())
    }
}
