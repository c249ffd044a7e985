//! Bounded batch generation of independent accounts.
//!
//! This module provides:
//! - Request validation (1 to [`MAX_BATCH_SIZE`] accounts)
//! - Sequential generation on the calling thread
//! - Parallel generation on a [`WorkerPool`]
//! - Cooperative cancellation through a shared stop flag

mod pool;
mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::crypto::{EntropySource, KeyPair};
use crate::error::{Error, Result};

pub use pool::WorkerPool;

/// Largest batch a single request may ask for.
pub const MAX_BATCH_SIZE: usize = 100;

/// A validated batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRequest {
    count: usize,
}

impl BatchRequest {
    /// Creates a request, rejecting counts outside `1..=MAX_BATCH_SIZE`.
    pub fn new(count: usize) -> Result<Self> {
        if !(1..=MAX_BATCH_SIZE).contains(&count) {
            return Err(Error::CountOutOfRange { count });
        }
        Ok(Self { count })
    }

    /// Number of accounts requested.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// How a batch is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// One account after another on the calling thread.
    #[default]
    Sequential,
    /// Fan out over worker threads (`0` = one per CPU core).
    Parallel { workers: usize },
}

impl BatchMode {
    /// Threads actually used for a batch of `count` accounts.
    pub fn worker_count(&self, count: usize) -> usize {
        match *self {
            BatchMode::Sequential => 1,
            BatchMode::Parallel { workers } => {
                let workers = if workers == 0 { num_cpus::get() } else { workers };
                workers.clamp(1, count.max(1))
            }
        }
    }
}

/// Generates `request.count()` independent keypairs in generation order.
pub fn generate_batch<E>(
    request: &BatchRequest,
    mode: BatchMode,
    entropy: &Arc<E>,
) -> Result<Vec<KeyPair>>
where
    E: EntropySource + ?Sized + 'static,
{
    let stop_flag = Arc::new(AtomicBool::new(false));
    generate_batch_cancellable(request, mode, entropy, &stop_flag)
}

/// Like [`generate_batch`], but abandons the batch once `stop_flag` is set.
///
/// A cancelled batch returns [`Error::Cancelled`]; keys generated so far are
/// dropped (and wiped) rather than returned.
pub fn generate_batch_cancellable<E>(
    request: &BatchRequest,
    mode: BatchMode,
    entropy: &Arc<E>,
    stop_flag: &Arc<AtomicBool>,
) -> Result<Vec<KeyPair>>
where
    E: EntropySource + ?Sized + 'static,
{
    let start = Instant::now();
    let count = request.count();
    let workers = mode.worker_count(count);
    debug!(count, ?mode, workers, "starting batch");

    let keypairs = match mode {
        BatchMode::Sequential => {
            let mut keypairs = Vec::with_capacity(count);
            for _ in 0..count {
                if stop_flag.load(Ordering::Relaxed) {
                    return Err(Error::Cancelled);
                }
                keypairs.push(KeyPair::generate(&**entropy)?);
            }
            keypairs
        }
        BatchMode::Parallel { .. } => {
            let mut pool = WorkerPool::with_stop_flag(workers, entropy.clone(), stop_flag.clone())?;
            let keypairs = pool.run(request)?;
            pool.join();
            keypairs
        }
    };

    info!(
        count,
        workers,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
    Ok(keypairs)
}
