//! Scheduler port
//!
//! A one-shot timer abstraction: `arm(duration, on_expire)` returns a
//! [`TimerHandle`] whose `cancel()` prevents the task from running.
//!
//! [`ManualScheduler`] drives timers from a clock advanced by hand, for tests
//! that must not wait on wall-clock time.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Work to run when a timer fires
pub type ExpiryTask = BoxFuture<'static, ()>;

/// Schedules one-shot timers
pub trait Scheduler: Send + Sync {
    /// Run `on_expire` once `duration` has elapsed, unless cancelled first
    fn arm(&self, duration: Duration, on_expire: ExpiryTask) -> TimerHandle;
}

/// Handle to an armed timer
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            abort: None,
        }
    }

    /// Also abort this task on cancel
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct ManualTimer {
    deadline: Duration,
    cancelled: Arc<AtomicBool>,
    task: ExpiryTask,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    timers: Vec<ManualTimer>,
}

/// [`Scheduler`] driven by an explicit clock
///
/// Time only moves when [`ManualScheduler::advance`] is called. Due timers
/// run in deadline order on the caller's task.
#[derive(Default)]
pub struct ManualScheduler {
    clock: Mutex<ManualClock>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation
    pub fn now(&self) -> Duration {
        self.clock.lock().unwrap_or_else(|e| e.into_inner()).now
    }

    /// Number of armed, uncancelled timers
    pub fn pending(&self) -> usize {
        self.clock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .timers
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move the clock forward and run every timer that came due.
    pub async fn advance(&self, by: Duration) {
        let due = {
            let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
            clock.now += by;
            let now = clock.now;
            let (mut due, pending): (Vec<_>, Vec<_>) = clock
                .timers
                .drain(..)
                .filter(|t| !t.cancelled.load(Ordering::SeqCst))
                .partition(|t| t.deadline <= now);
            clock.timers = pending;
            due.sort_by_key(|t| t.deadline);
            due
        };

        for timer in due {
            // An earlier timer in this batch may have cancelled this one.
            if !timer.cancelled.load(Ordering::SeqCst) {
                timer.task.await;
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&self, duration: Duration, on_expire: ExpiryTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        let deadline = clock.now + duration;
        clock.timers.push(ManualTimer {
            deadline,
            cancelled: cancelled.clone(),
            task: on_expire,
        });
        TimerHandle::new(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>) -> ExpiryTask {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_fires_only_after_deadline() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let _handle = scheduler.arm(Duration::from_secs(10), counting_task(&fired));

        scheduler.advance(Duration::from_secs(9)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_timer_never_fires() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.arm(Duration::from_secs(1), counting_task(&fired));
        handle.cancel();

        scheduler.advance(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropping_handle_keeps_timer() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        drop(scheduler.arm(Duration::from_secs(1), counting_task(&fired)));

        scheduler.advance(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (name, secs) in [("late", 3), ("early", 1)] {
            let order = order.clone();
            let _ = scheduler.arm(
                Duration::from_secs(secs),
                async move { order.lock().unwrap().push(name) }.boxed(),
            );
        }

        scheduler.advance(Duration::from_secs(5)).await;
        assert_eq!(*order.lock().unwrap(), vec!["early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_secs(5));
    }
}
