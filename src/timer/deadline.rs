use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use crate::protocol::{COUNTDOWN_DECAY, COUNTDOWN_TICK};

/// Progress reporting for a deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    /// Delay between progress reports
    pub tick: Duration,

    /// How much faster than the deadline the progress drains; 1.0 reaches 0 exactly at expiry
    pub decay: f64,
}

impl Default for Countdown {
    fn default() -> Self {
        Countdown {
            tick: COUNTDOWN_TICK,
            decay: COUNTDOWN_DECAY,
        }
    }
}

type TickFn = Box<dyn FnMut(f64) + Send>;

struct CountdownState {
    ticker: Interval,
    started: Instant,
    duration: Duration,
    decay: f64,
    last: f64,
    on_tick: TickFn,
}

impl CountdownState {
    async fn next(&mut self) -> f64 {
        self.ticker.tick().await;
        let elapsed = self.started.elapsed().as_secs_f64();
        let spent = elapsed / self.duration.as_secs_f64() * self.decay * 100.0;
        let progress = 100.0 - spent;
        if progress.is_finite() {
            self.last = progress.clamp(0.0, self.last);
        }
        self.last
    }
}

/// Unusable decay values fall back to draining exactly over the duration
fn sane_decay(decay: f64) -> f64 {
    if decay.is_finite() && decay > 0.0 { decay } else { 1.0 }
}

async fn next_progress(countdown: &mut Option<CountdownState>) -> f64 {
    match countdown {
        Some(state) => state.next().await,
        None => std::future::pending().await,
    }
}

/// Single-shot timer.
///
/// `on_expire` fires exactly once when `duration` elapses, unless the timer is
/// stopped first. With a countdown attached, progress in `[0, 100]` is reported
/// every tick; ticks stop once progress hits 0 and never trigger expiry.
pub struct DeadlineTimer {
    /// Total duration
    duration: Duration,

    /// Cleared on stop or expiry
    active: Arc<AtomicBool>,

    /// Timer task
    handle: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    /// Start a plain deadline
    pub fn start<E>(duration: Duration, on_expire: E) -> Self
    where
        E: FnOnce() + Send + 'static,
    {
        DeadlineTimer::spawn(duration, on_expire, None)
    }

    /// Start a deadline that also reports decaying progress
    pub fn start_with_countdown<E, K>(
        duration: Duration,
        countdown: Countdown,
        on_expire: E,
        on_tick: K,
    ) -> Self
    where
        E: FnOnce() + Send + 'static,
        K: FnMut(f64) + Send + 'static,
    {
        DeadlineTimer::spawn(duration, on_expire, Some((countdown, Box::new(on_tick))))
    }

    fn spawn<E>(duration: Duration, on_expire: E, countdown: Option<(Countdown, TickFn)>) -> Self
    where
        E: FnOnce() + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let started = Instant::now();

        let mut countdown = countdown.map(|(settings, on_tick)| {
            let tick = settings.tick.max(Duration::from_millis(1));
            let mut ticker = interval_at(started + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            CountdownState {
                ticker,
                started,
                duration: duration.max(Duration::from_millis(1)),
                decay: sane_decay(settings.decay),
                last: 100.0,
                on_tick,
            }
        });

        let handle = tokio::spawn(async move {
            let mut on_expire = Some(on_expire);
            let expiry = sleep_until(started + duration);
            tokio::pin!(expiry);

            loop {
                tokio::select! {
                    biased;

                    _ = &mut expiry => {
                        if flag.swap(false, Ordering::AcqRel) {
                            if let Some(fire) = on_expire.take() {
                                fire();
                            }
                        }
                        return;
                    }

                    progress = next_progress(&mut countdown) => {
                        if !flag.load(Ordering::Acquire) {
                            return;
                        }
                        if let Some(state) = countdown.as_mut() {
                            (state.on_tick)(progress);
                        }
                        if progress <= 0.0 {
                            countdown = None;
                        }
                    }
                }
            }
        });

        DeadlineTimer {
            duration,
            active,
            handle: Some(handle),
        }
    }

    /// Stop the timer. Idempotent.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Check if still counting down
    pub fn is_active(&self) -> bool {
        self.handle.is_some() && self.active.load(Ordering::Acquire)
    }

    /// Check if the timer task may still call back
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Get total duration
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
