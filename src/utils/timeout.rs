//! Default deadlines and deadline helpers.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Status queries (token, login, statistics, QoS).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Cable diagnostics; the device measures the line before answering.
pub const CABLE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a discovery request collects answers.
pub const DISCOVERY_WINDOW: Duration = Duration::from_secs(1);

/// Deadline `timeout` from now.
#[inline]
pub fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout
}

/// Run `fut` until `deadline`, yielding `None` if the deadline passes first.
pub async fn until_deadline<F>(deadline: Instant, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::time::timeout_at(deadline, fut).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_future_completes() {
        let out = until_deadline(deadline_after(Duration::from_millis(50)), async { 7 }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn test_pending_future_times_out_after_deadline() {
        let started = Instant::now();
        let out = until_deadline(
            deadline_after(Duration::from_millis(60)),
            std::future::pending::<()>(),
        )
        .await;
        assert!(out.is_none());
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
