use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use crate::{Error, Result};

/// Result of one probe invocation
#[derive(Debug)]
pub enum ProbeOutcome<T> {
    /// Nothing changed, probe again next interval
    Continue,

    /// Stop polling and hand the payload over
    Transition(T),

    /// Stop polling and report the failure
    Abort(Error),
}

/// Runs an async probe on a fixed cadence until stopped or settled.
///
/// The first probe runs immediately. A probe only starts after the previous one
/// finished, so at most one request is outstanding per poller. When a probe
/// returns `Transition` or `Abort` the poller settles: `on_settle` runs once and
/// the poller goes inactive. Once `stop()` returns, neither the probe nor
/// `on_settle` will run again for this instance.
///
/// Must be started from within a tokio runtime.
pub struct Poller {
    /// Delay between probe starts
    interval: Duration,

    /// Cleared on stop or settle
    active: Arc<AtomicBool>,

    /// Polling task
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling
    pub fn start<T, P, Fut, S>(every: Duration, mut probe: P, on_settle: S) -> Self
    where
        T: Send + 'static,
        P: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ProbeOutcome<T>> + Send + 'static,
        S: FnOnce(Result<T>) + Send + 'static,
    {
        let every = every.max(Duration::from_millis(1));
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !flag.load(Ordering::Acquire) {
                    return;
                }

                let settled = match probe().await {
                    ProbeOutcome::Continue => continue,
                    ProbeOutcome::Transition(payload) => Ok(payload),
                    ProbeOutcome::Abort(err) => Err(err),
                };

                // A stop() that raced the probe wins; the result is dropped
                if flag.swap(false, Ordering::AcqRel) {
                    on_settle(settled);
                }
                return;
            }
        });

        Poller {
            interval: every,
            active,
            handle: Some(handle),
        }
    }

    /// Stop polling. Idempotent.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Check if still polling
    pub fn is_active(&self) -> bool {
        self.handle.is_some() && self.active.load(Ordering::Acquire)
    }

    /// Check if the polling task may still call back
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Get probe interval
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
