//! Countdown timer for timed sessions.
//!
//! A started timer owns a tokio task that decrements a remaining-seconds
//! counter once per wall-clock second and invokes an expiry callback exactly
//! once when it reaches zero.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A restartable one-second countdown.
///
/// The expiry callback runs strictly after the tick loop has terminated, so
/// it can never race a live countdown into firing twice. Stopping (or
/// dropping) the timer aborts the tick task; a stopped timer never invokes
/// its callback.
#[derive(Default)]
pub struct CountdownTimer {
    running: Option<RunningCountdown>,
}

struct RunningCountdown {
    remaining: watch::Receiver<u32>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ticking down from `limit_secs`.
    ///
    /// `on_expire` is invoked exactly once, when the counter reaches zero.
    /// Calling `start` while already running is a programmer error: it is
    /// logged and ignored, and the original countdown keeps running.
    /// Restarting after `stop` or after expiry is allowed.
    pub fn start<F>(&mut self, limit_secs: u32, on_expire: F)
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        if self.is_running() {
            tracing::warn!(limit_secs, "countdown already running, ignoring start");
            return;
        }

        let (tx, rx) = watch::channel(limit_secs);
        let task = tokio::spawn(async move {
            let mut remaining = limit_secs;
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately;
            // consume it so each loop iteration waits a full second.
            ticker.tick().await;

            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;
                let _ = tx.send(remaining);
            }

            // The tick loop has terminated before the callback runs.
            tracing::debug!("countdown expired");
            on_expire().await;
        });

        self.running = Some(RunningCountdown {
            remaining: rx,
            task,
        });
    }

    /// Halt ticking. Idempotent; safe when never started. The expiry
    /// callback will not fire for a stopped countdown.
    pub fn stop(&mut self) {
        if let Some(countdown) = self.running.take() {
            countdown.task.abort();
        }
    }

    /// Whether a countdown is currently ticking.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|countdown| !countdown.task.is_finished())
    }

    /// Seconds left on the current countdown. `None` when never started or
    /// stopped; `0` once expired. Never negative.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.running
            .as_ref()
            .map(|countdown| *countdown.remaining.borrow())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use futures::FutureExt;

    fn counting_callback(fired: &Arc<AtomicU32>) -> impl FnOnce() -> BoxFuture<'static, ()> + Send {
        let fired = Arc::clone(fired);
        move || {
            async move {
                fired.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        }
    }

    /// Let woken tasks run to their next await point.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_secs(secs: u64) {
        tokio::time::advance(Duration::from_secs(secs)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();
        timer.start(3, counting_callback(&fired));
        settle().await;

        assert_eq!(timer.remaining_secs(), Some(3));
        advance_secs(1).await;
        assert_eq!(timer.remaining_secs(), Some(2));
        advance_secs(1).await;
        assert_eq!(timer.remaining_secs(), Some(1));
        assert_eq!(fired.load(Ordering::SeqCst), 0, "must not fire early");

        advance_secs(1).await;
        assert_eq!(timer.remaining_secs(), Some(0));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_exactly_once() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();
        timer.start(1, counting_callback(&fired));
        settle().await;

        advance_secs(10).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_secs(), Some(0), "remaining never goes negative");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_expiry() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();
        timer.start(2, counting_callback(&fired));
        settle().await;

        advance_secs(1).await;
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), None);

        advance_secs(10).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // Stop is idempotent.
        timer.stop();
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_original_countdown() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();
        timer.start(2, counting_callback(&first));
        settle().await;
        advance_secs(1).await;

        // Ignored: the 2-second countdown is already at 1.
        timer.start(100, counting_callback(&second));
        assert_eq!(timer.remaining_secs(), Some(1));

        advance_secs(1).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_expiry_allowed() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();
        timer.start(1, counting_callback(&fired));
        settle().await;
        advance_secs(1).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        timer.start(1, counting_callback(&fired));
        settle().await;
        advance_secs(1).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_countdown() {
        let fired = Arc::new(AtomicU32::new(0));
        {
            let mut timer = CountdownTimer::new();
            timer.start(1, counting_callback(&fired));
            settle().await;
        }
        advance_secs(10).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
