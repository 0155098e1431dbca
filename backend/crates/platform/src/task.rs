//! Deadline-bounded execution
//!
//! Every call that leaves the process (or burns a lot of CPU) goes through one of these
//! helpers so that a stuck dependency turns into an error instead of a hung request.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("operation did not complete within {0:?}")]
    TimedOut(Duration),

    /// The blocking worker panicked or was cancelled by runtime shutdown.
    #[error("blocking task aborted: {0}")]
    Aborted(String),
}

/// Await `fut`, giving up after `limit`.
pub async fn bounded<F, T>(limit: Duration, fut: F) -> Result<T, TaskError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TaskError::TimedOut(limit))
}

/// Run CPU-heavy `f` on the blocking pool so the executor threads keep serving other
/// requests. The deadline stops the caller from waiting; the worker itself runs to completion.
pub async fn spawn_blocking_bounded<F, T>(limit: Duration, f: F) -> Result<T, TaskError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    bounded(limit, tokio::task::spawn_blocking(f))
        .await?
        .map_err(|e| TaskError::Aborted(e.to_string()))
}
