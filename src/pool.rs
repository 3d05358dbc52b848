//! Bounded dispatch of API work onto Tokio tasks.
//!
//! Each submitted future runs in its own task once a semaphore permit is
//! available; the permit is released when the task finishes (RAII). With one
//! torrent per invocation only a single task is ever in flight, but the pool
//! keeps the call site ready for batching several torrents.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 64;

/// Default worker count.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Errors from the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidSize {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("worker pool closed unexpectedly")]
    Closed,

    /// The task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Semaphore-bounded task pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(DEFAULT_WORKER_COUNT)),
            size: DEFAULT_WORKER_COUNT,
        }
    }
}

impl WorkerPool {
    /// Creates a pool running at most `size` tasks at once.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidSize`] outside 1..=64.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&size) {
            return Err(PoolError::InvalidSize { value: size });
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        })
    }

    /// Configured worker count.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of workers currently idle.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Runs `work` on a pooled task and waits for its output.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Join`] if the task panics, [`PoolError::Closed`]
    /// if the pool has been shut down.
    pub async fn run<F, T>(&self, work: F) -> Result<T, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;
        debug!(available = self.semaphore.available_permits(), "worker acquired");

        let handle = tokio::spawn(async move {
            let _permit = permit;
            work.await
        });
        Ok(handle.await?)
    }
}
