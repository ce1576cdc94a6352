//! Sliding-window admission for outgoing probes.
//!
//! At most `limit` calls start in each `interval`. A call that arrives when the
//! current window is full opens the next window and waits for its start, so a
//! burst is deferred to window boundaries rather than spread evenly.

use anyhow::{Result, anyhow};
use log::trace;
use std::{
    future::Future,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, time::Instant};

#[derive(Debug, Default)]
struct Window {
    start: Option<Instant>,
    active: usize,
}

#[derive(Debug)]
pub struct Throttle {
    limit: usize,
    interval: Duration,
    window: Mutex<Window>,
    pending: AtomicUsize,
    // Bumped by abort_pending(); waiting calls compare against the value they saw on admission
    abort_epoch: watch::Sender<u64>,
}

/// Decrements the pending counter however the waiting call ends.
struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Throttle {
    pub fn new(limit: usize, interval: Duration) -> Result<Self> {
        if limit == 0 {
            return Err(anyhow!("Throttle limit must be at least 1"));
        }
        if interval.is_zero() {
            return Err(anyhow!("Throttle interval must be greater than zero"));
        }
        let (abort_epoch, _) = watch::channel(0);
        Ok(Self {
            limit,
            interval,
            window: Mutex::new(Window::default()),
            pending: AtomicUsize::new(0),
            abort_epoch,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of admitted calls still waiting for their window to open.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Fails every call currently waiting for its window. Later calls are unaffected.
    pub fn abort_pending(&self) {
        trace!("Aborting {} pending throttled calls", self.pending());
        self.abort_epoch.send_modify(|epoch| *epoch += 1);
    }

    /// Runs `f` once the call has been admitted.
    pub async fn run<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let delay = self.admit(Instant::now());

        if !delay.is_zero() {
            trace!("Deferring throttled call by {:?}", delay);
            let mut aborted = self.abort_epoch.subscribe();
            let epoch = *aborted.borrow_and_update();

            self.pending.fetch_add(1, Ordering::SeqCst);
            let _guard = PendingGuard(&self.pending);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = aborted.wait_for(|current| *current != epoch) => {
                    return Err(anyhow!("Throttled call aborted before it started"));
                }
            }
        }

        Ok(f().await)
    }

    /// Books a slot for a call arriving at `now` and returns how long it must wait.
    fn admit(&self, now: Instant) -> Duration {
        let mut window = self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match window.start {
            Some(start) if now.saturating_duration_since(start) <= self.interval => {
                if window.active < self.limit {
                    window.active += 1;
                } else {
                    window.start = Some(start + self.interval);
                    window.active = 1;
                }
            }
            _ => {
                window.start = Some(now);
                window.active = 1;
            }
        }

        window.start.map(|start| start.saturating_duration_since(now)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    fn throttle(limit: usize, interval_ms: u64) -> Throttle {
        Throttle::new(limit, Duration::from_millis(interval_ms)).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_limit() {
        assert!(Throttle::new(0, Duration::from_millis(1000)).is_err());
    }

    #[test]
    fn test_new_rejects_zero_interval() {
        assert!(Throttle::new(2, Duration::ZERO).is_err());
    }

    #[test]
    fn test_admit_schedules_bursts_on_window_boundaries() {
        let t = throttle(2, 1000);
        let now = Instant::now();

        let delays: Vec<_> = (0..5).map(|_| t.admit(now).as_millis()).collect();
        assert_eq!(delays, vec![0, 0, 1000, 1000, 2000]);
    }

    #[test]
    fn test_admit_starts_fresh_window_after_interval() {
        let t = throttle(1, 1000);
        let start = Instant::now();

        assert_eq!(t.admit(start), Duration::ZERO);
        // Exactly one interval later still belongs to the old window
        assert_eq!(t.admit(start + Duration::from_millis(1000)), Duration::from_millis(0));
        assert_eq!(t.admit(start + Duration::from_millis(2500)), Duration::ZERO);
    }

    #[test]
    fn test_admit_fills_future_window_before_opening_another() {
        let t = throttle(2, 1000);
        let start = Instant::now();

        t.admit(start);
        t.admit(start);
        assert_eq!(t.admit(start), Duration::from_millis(1000));
        // Arrives later but still before the deferred window opens: joins it
        assert_eq!(t.admit(start + Duration::from_millis(400)), Duration::from_millis(600));
        assert_eq!(t.admit(start + Duration::from_millis(400)), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_calls_spread_over_three_windows() {
        let t = throttle(2, 1000);
        let origin = Instant::now();

        let started = join_all((0..5).map(|_| t.run(|| async { Instant::now() }))).await;
        let offsets: Vec<u128> =
            started.into_iter().map(|s| s.unwrap().duration_since(origin).as_millis()).collect();

        let in_window = |lo: u128, hi: u128| offsets.iter().filter(|o| **o >= lo && **o < hi).count();
        assert_eq!(in_window(0, 1000), 2);
        assert_eq!(in_window(1000, 2000), 2);
        assert_eq!(in_window(2000, 3000), 1);
        assert_eq!(t.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_pending_rejects_waiting_calls_only() {
        let t = throttle(1, 1000);

        let (first, second, _) = tokio::join!(
            t.run(|| async { 1 }),
            t.run(|| async { 2 }),
            async {
                tokio::task::yield_now().await;
                assert_eq!(t.pending(), 1);
                t.abort_pending();
            }
        );

        assert_eq!(first.unwrap(), 1);
        assert!(second.is_err());
        assert_eq!(t.pending(), 0);

        // Calls made after the abort are admitted normally
        tokio::time::advance(Duration::from_millis(5000)).await;
        assert_eq!(t.run(|| async { 3 }).await.unwrap(), 3);
    }
}
