//! Activity monitor: the idle countdown of an open chat view.
//!
//! One countdown is outstanding at a time. Every qualifying
//! [`ActivitySignal`] cancels it and arms a fresh one; when a countdown runs
//! out the expiry callback runs once.
//!
//! Each arm bumps a generation counter. A firing timer only runs the callback
//! if its generation is still current and the monitor is still armed, so a
//! rearm that races an expiry either wins cleanly or loses cleanly.

use crate::ports::scheduler::{Scheduler, TimerHandle};
use futures::FutureExt;
use futures::future::BoxFuture;
use insight_domain::ActivitySignal;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace};

/// Callback run when the countdown expires
pub type ExpiryCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct MonitorState {
    armed: bool,
    generation: u64,
    timer: Option<TimerHandle>,
}

/// Idle countdown rearmed by user activity
pub struct ActivityMonitor {
    scheduler: Arc<dyn Scheduler>,
    timeout: Duration,
    on_expire: ExpiryCallback,
    state: Arc<Mutex<MonitorState>>,
}

impl ActivityMonitor {
    pub fn new<F>(scheduler: Arc<dyn Scheduler>, timeout: Duration, on_expire: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            scheduler,
            timeout,
            on_expire: Arc::new(on_expire),
            state: Arc::new(Mutex::new(MonitorState::default())),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arm the countdown. Restarts it if already armed.
    pub fn start(&self) {
        let mut state = self.lock();
        state.armed = true;
        self.rearm(&mut state);
        debug!(timeout_secs = self.timeout.as_secs(), "activity monitor armed");
    }

    /// Record user activity. Returns `false` if the monitor is not armed.
    pub fn record(&self, signal: ActivitySignal) -> bool {
        let mut state = self.lock();
        if !state.armed {
            return false;
        }
        trace!(signal = signal.as_str(), "activity");
        self.rearm(&mut state);
        true
    }

    /// Disarm and cancel the outstanding countdown.
    pub fn stop(&self) {
        let mut state = self.lock();
        if state.armed {
            debug!("activity monitor stopped");
        }
        state.armed = false;
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    fn rearm(&self, state: &mut MonitorState) {
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.generation += 1;
        let generation = state.generation;

        let shared = Arc::downgrade(&self.state);
        let on_expire = self.on_expire.clone();
        let task = async move {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            {
                let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
                if !state.armed || state.generation != generation {
                    return;
                }
                // Fire once; drop the handle without cancelling ourselves.
                state.armed = false;
                state.timer = None;
            }
            debug!("idle timeout elapsed");
            on_expire().await;
        }
        .boxed();

        state.timer = Some(self.scheduler.arm(self.timeout, task));
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::scheduler::ManualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(15 * 60);

    fn monitor(scheduler: &Arc<ManualScheduler>) -> (ActivityMonitor, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let monitor = ActivityMonitor::new(scheduler.clone(), TIMEOUT, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        });
        (monitor, fired)
    }

    #[tokio::test]
    async fn test_expires_once_without_activity() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, fired) = monitor(&scheduler);
        monitor.start();

        scheduler.advance(TIMEOUT - Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        scheduler.advance(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!monitor.is_armed());

        scheduler.advance(TIMEOUT * 3).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activity_resets_countdown() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, fired) = monitor(&scheduler);
        monitor.start();

        for signal in ActivitySignal::ALL {
            scheduler.advance(TIMEOUT - Duration::from_secs(1)).await;
            assert!(monitor.record(signal));
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(TIMEOUT).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_cancels_countdown() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, fired) = monitor(&scheduler);
        monitor.start();
        monitor.stop();

        assert!(!monitor.record(ActivitySignal::Click));
        scheduler.advance(TIMEOUT * 2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_signals_ignored_before_start() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, _fired) = monitor(&scheduler);
        assert!(!monitor.record(ActivitySignal::KeyPress));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_drop_cancels_countdown() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, fired) = monitor(&scheduler);
        monitor.start();
        drop(monitor);

        scheduler.advance(TIMEOUT).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_generation_does_not_fire() {
        // A timer that was not cancelled (e.g. already running when the
        // rearm happened) must still be ignored.
        let scheduler = Arc::new(ManualScheduler::new());
        let (monitor, fired) = monitor(&scheduler);
        monitor.start();

        let stale = {
            let mut state = monitor.lock();
            state.timer.take()
        };
        monitor.record(ActivitySignal::Scroll);
        drop(stale);

        scheduler.advance(TIMEOUT).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
