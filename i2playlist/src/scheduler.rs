//! Delayed task scheduling
//!
//! The orchestrator's deferred steps (the delayed run and the two
//! follow-on waves) go through this helper instead of raw timer calls so
//! that the deferral is a named, testable thing. Under tokio's paused
//! test clock these tasks fire deterministically without real sleeps.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn a future that starts running after `delay`
///
/// The returned [`ScheduledTask`] does not need to be kept: dropping it
/// detaches the task, which keeps the orchestrator's fire-and-forget
/// semantics. Holding on to it allows cancellation before the delay
/// elapses.
pub fn spawn_after<F>(delay: Duration, future: F) -> ScheduledTask
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        future.await;
    });
    ScheduledTask { handle }
}

/// Handle to a task scheduled with [`spawn_after`]
///
/// Dropping the handle detaches the task; it will still fire.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Cancel the task if it has not completed yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has completed (or was cancelled)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Explicitly detach the task
    pub fn detach(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_spawn_after_fires_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        spawn_after(Duration::from_secs(5), async move {
            flag.store(true, Ordering::SeqCst);
        })
        .detach();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_delay_elapses() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let task = spawn_after(Duration::from_secs(5), async move {
            flag.store(true, Ordering::SeqCst);
        });
        task.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_still_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        drop(spawn_after(Duration::from_secs(1), async move {
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
