//! Worker pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::crypto::{EntropySource, KeyPair};
use crate::error::{Error, Result};

use super::worker::{Worker, WorkerMessage, WorkerStats};
use super::{BatchRequest, MAX_BATCH_SIZE};

/// How often a waiting pool re-checks the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Manages a pool of threads that generate keypairs in parallel.
///
/// Once stopped (explicitly, through the shared flag, or after a worker
/// error) a pool runs no further batches.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Job sender; dropped to let idle workers exit
    job_tx: Option<Sender<usize>>,
    /// Channel receiver for results
    result_rx: Receiver<WorkerMessage>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
}

impl WorkerPool {
    /// Creates a new worker pool with the specified number of workers.
    pub fn new<E>(num_workers: usize, entropy: Arc<E>) -> Result<Self>
    where
        E: EntropySource + ?Sized + 'static,
    {
        Self::with_stop_flag(num_workers, entropy, Arc::new(AtomicBool::new(false)))
    }

    /// Creates a pool that also stops when an externally owned flag is set
    /// (e.g. by a Ctrl-C handler).
    pub fn with_stop_flag<E>(
        num_workers: usize,
        entropy: Arc<E>,
        stop_flag: Arc<AtomicBool>,
    ) -> Result<Self>
    where
        E: EntropySource + ?Sized + 'static,
    {
        let num_workers = num_workers.max(1);
        let (job_tx, job_rx) = bounded(MAX_BATCH_SIZE);
        let (result_tx, result_rx) = bounded(MAX_BATCH_SIZE);
        let stats = Arc::new(WorkerStats::new());

        let mut pool = Self {
            num_workers,
            handles: Some(Vec::with_capacity(num_workers)),
            job_tx: Some(job_tx),
            result_rx,
            stop_flag,
            stats,
        };

        for id in 0..num_workers {
            let worker = Worker::new(
                id,
                entropy.clone(),
                job_rx.clone(),
                result_tx.clone(),
                pool.stop_flag.clone(),
                pool.stats.clone(),
            );

            // On failure the partially built pool is dropped, which stops and joins
            // the workers spawned so far.
            let handle = thread::Builder::new()
                .name(format!("keygen-worker-{}", id))
                .spawn(move || worker.run())
                .map_err(Error::WorkerSpawn)?;

            if let Some(handles) = pool.handles.as_mut() {
                handles.push(handle);
            }
        }

        debug!(workers = num_workers, "worker pool started");
        Ok(pool)
    }

    /// Generates one keypair per requested slot and returns them in job order.
    ///
    /// Takes `&mut self` so only one batch is in flight on the shared channels.
    /// The first worker error stops the pool and is returned; results from
    /// other workers are discarded.
    pub fn run(&mut self, request: &BatchRequest) -> Result<Vec<KeyPair>> {
        if self.is_stopped() {
            return Err(Error::Cancelled);
        }

        let job_tx = self.job_tx.as_ref().ok_or(Error::WorkerDisconnected)?;
        let count = request.count();
        for index in 0..count {
            job_tx.send(index).map_err(|_| Error::WorkerDisconnected)?;
        }

        let mut slots: Vec<Option<KeyPair>> = vec![None; count];
        let mut received = 0;

        while received < count {
            if self.is_stopped() {
                return Err(Error::Cancelled);
            }

            match self.result_rx.recv_timeout(POLL_INTERVAL) {
                Ok((index, Ok(keypair))) => match slots.get_mut(index) {
                    Some(slot) if slot.is_none() => {
                        *slot = Some(keypair);
                        received += 1;
                    }
                    _ => {
                        warn!(job = index, "result for unknown job, stopping batch");
                        self.stop();
                        return Err(Error::WorkerDisconnected);
                    }
                },
                Ok((index, Err(err))) => {
                    warn!(job = index, error = %err, "worker failed, stopping batch");
                    self.stop();
                    return Err(err);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.stop();
                    return Err(Error::WorkerDisconnected);
                }
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::WorkerDisconnected)
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops the workers and waits for them to exit.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Closing the job channel wakes workers blocked on it
        self.job_tx.take();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
