//! Monotonic deadlines passed to every plugin operation.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Upper bound applied to deadlines whose timeout overflows the clock.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Point in monotonic time by which a plugin operation must complete.
///
/// Deadlines are absolute so they can be handed down through nested calls
/// without each layer re-deriving its own budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(Instant);

/// Error returned when a future bounded by a [`Deadline`] does not finish in
/// time.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("deadline elapsed")]
pub struct DeadlineElapsed;

impl Deadline {
    /// Creates a deadline `timeout` from now.
    ///
    /// Timeouts too large to represent saturate to [`FAR_FUTURE`] from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        let instant = now
            .checked_add(timeout)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self(instant)
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn has_elapsed(self) -> bool {
        Instant::now() >= self.0
    }

    /// Drives `future` until it completes or the deadline passes.
    ///
    /// The future is dropped on expiry, which cancels it.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineElapsed`] when the deadline passes first.
    pub async fn run<F>(self, future: F) -> Result<F::Output, DeadlineElapsed>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.0, future)
            .await
            .map_err(|_| DeadlineElapsed)
    }
}
