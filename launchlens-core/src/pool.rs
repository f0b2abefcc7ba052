//! Bounded, order-preserving worker pool for upstream work.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::Result;

/// Default number of items processed at once.
pub const DEFAULT_CONCURRENCY: usize = 5;
/// Default time budget per item.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(30);

/// Why one item produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The item exceeded its time budget and was aborted.
    Timeout(Duration),
    /// The item returned an error.
    Failed(String),
    /// The item panicked or was cancelled.
    Panicked(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Timeout(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
            PoolError::Failed(message) => write!(f, "failed: {message}"),
            PoolError::Panicked(message) => write!(f, "panicked: {message}"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Runs one async task per item with bounded concurrency and a per-item timeout.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
    item_timeout: Duration,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY, DEFAULT_ITEM_TIMEOUT)
    }
}

impl WorkerPool {
    /// Create a pool. A concurrency of zero is treated as one.
    pub fn new(concurrency: usize, item_timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            item_timeout,
        }
    }

    /// Maximum number of items in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Time budget per item.
    pub fn item_timeout(&self) -> Duration {
        self.item_timeout
    }

    /// Run `task` for every item and return the results in input order.
    ///
    /// A failure, panic or timeout affects only the slot of the item that
    /// caused it.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, task: F) -> Vec<std::result::Result<T, PoolError>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let total = items.len();
        let task = Arc::new(task);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    log::warn!("worker pool closed early: {err}");
                    break;
                }
            };
            let task = task.clone();
            let limit = self.item_timeout;
            tasks.spawn(async move {
                let _permit = permit;
                let mut handle = tokio::spawn(async move { (*task)(item).await });
                let result = match tokio::time::timeout(limit, &mut handle).await {
                    Ok(Ok(Ok(value))) => Ok(value),
                    Ok(Ok(Err(err))) => Err(PoolError::Failed(err.to_string())),
                    Ok(Err(err)) => Err(PoolError::Panicked(err.to_string())),
                    Err(_) => {
                        handle.abort();
                        Err(PoolError::Timeout(limit))
                    }
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<std::result::Result<T, PoolError>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Err(err) = &result {
                        log::warn!("item {index} {err}");
                    }
                    slots[index] = Some(result);
                }
                Err(err) => log::warn!("worker task lost: {err}"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(PoolError::Panicked("task cancelled".to_string())))
            })
            .collect()
    }
}
