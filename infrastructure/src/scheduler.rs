//! Tokio-backed [`Scheduler`].

use insight_application::{ExpiryTask, Scheduler, TimerHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Runs each timer as a spawned task that sleeps for the timeout.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&self, duration: Duration, on_expire: ExpiryTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            on_expire.await;
        });
        TimerHandle::new(cancelled).with_abort(task.abort_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(count: &Arc<AtomicUsize>) -> ExpiryTask {
        let count = Arc::clone(count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_duration() {
        let count = Arc::new(AtomicUsize::new(0));
        let _handle = TokioScheduler::new().arm(Duration::from_secs(900), counting_task(&count));

        tokio::time::sleep(Duration::from_secs(899)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler::new().arm(Duration::from_secs(10), counting_task(&count));
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(20)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_keeps_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        drop(TokioScheduler::new().arm(Duration::from_secs(5), counting_task(&count)));

        tokio::time::sleep(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
