//! Batch worker thread body.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use tracing::trace;

use crate::crypto::{EntropySource, KeyPair};
use crate::error::Result;

/// Message sent from a worker back to the pool: the job index and its outcome.
pub(crate) type WorkerMessage = (usize, Result<KeyPair>);

/// Counters shared by all workers in a pool.
#[derive(Debug, Default)]
pub(crate) struct WorkerStats {
    /// Keypairs generated
    pub keys_generated: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub(crate) fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }
}

/// A worker that turns job indices into freshly generated keypairs.
pub(crate) struct Worker<E: ?Sized> {
    /// Worker ID
    id: usize,
    /// Shared entropy handle; each job draws from it independently
    entropy: Arc<E>,
    /// Incoming job indices
    job_rx: Receiver<usize>,
    /// Channel to send results
    result_tx: Sender<WorkerMessage>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Pool statistics
    stats: Arc<WorkerStats>,
}

impl<E: EntropySource + ?Sized> Worker<E> {
    /// Creates a new worker.
    pub(crate) fn new(
        id: usize,
        entropy: Arc<E>,
        job_rx: Receiver<usize>,
        result_tx: Sender<WorkerMessage>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            entropy,
            job_rx,
            result_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Takes jobs until:
    /// - Stop flag is set
    /// - Job channel is closed
    /// - Generation fails (the error is reported, then the worker exits)
    pub(crate) fn run(&self) {
        trace!(worker = self.id, "worker started");

        for index in self.job_rx.iter() {
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }

            let outcome = KeyPair::generate(&*self.entropy);
            let failed = outcome.is_err();
            if !failed {
                self.stats.keys_generated.fetch_add(1, Ordering::Relaxed);
            }

            // Pool may already have given up on this batch
            if self.result_tx.send((index, outcome)).is_err() || failed {
                break;
            }
        }

        trace!(worker = self.id, "worker stopped");
    }
}
