//! Bounded worker pool for blocking fetches.
//!
//! The async fetch variants submit their blocking call here. A semaphore caps how
//! many run at once; the call itself runs on tokio's blocking thread pool.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error_handling::FetchError;

/// Bounded pool that runs blocking jobs off the async executor.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl BlockingPool {
    /// Creates a pool allowing `size` concurrent jobs (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Maximum number of concurrent jobs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running job.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stops accepting jobs. Jobs already running finish normally.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Waits for a permit, runs `job` on a blocking thread and awaits its result.
    ///
    /// # Errors
    ///
    /// - `FetchError::PoolClosed` if `close` was called
    /// - `FetchError::Worker` if the job panicked
    pub async fn run<F, T>(&self, job: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| FetchError::PoolClosed)?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        Ok(handle.await?)
    }
}
