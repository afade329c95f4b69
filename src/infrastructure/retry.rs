//! Bounded Retry
//!
//! Polls an async operation at a fixed interval until it reports done or
//! a deadline expires. Used for the eventual-consistency window between a
//! delete call and the provider actually dropping the resource.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Outcome of one retry attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// The condition is satisfied, stop retrying.
    Done,
    /// Not there yet; the reason is kept for the timeout error.
    Retry(String),
}

/// Deadline expired before the operation reported done.
#[derive(Debug, Error)]
#[error("timed out after {waited:?}: {last_reason}")]
pub struct RetryTimeout {
    /// Total time spent retrying
    pub waited: Duration,
    /// Reason reported by the last attempt
    pub last_reason: String,
}

/// Run `op` until it returns [`RetryDecision::Done`], sleeping `interval`
/// between attempts, for at most `deadline` total.
///
/// The first attempt runs immediately. An attempt is only started if it
/// can begin before the deadline; on expiry the last retry reason is
/// returned in the [`RetryTimeout`].
pub async fn retry_until<F, Fut>(
    deadline: Duration,
    interval: Duration,
    mut op: F,
) -> Result<(), RetryTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RetryDecision>,
{
    let start = Instant::now();
    loop {
        match op().await {
            RetryDecision::Done => return Ok(()),
            RetryDecision::Retry(reason) => {
                let elapsed = start.elapsed();
                if elapsed + interval >= deadline {
                    return Err(RetryTimeout {
                        waited: elapsed,
                        last_reason: reason,
                    });
                }
                tracing::debug!("retrying in {:?}: {}", interval, reason);
                sleep(interval).await;
            }
        }
    }
}
