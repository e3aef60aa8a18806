use std::time::Duration;
use crate::{Error, Result};
use crate::protocol::{COMPLETION_POLL_INTERVAL, CONFIRM_WINDOW, MATCH_POLL_INTERVAL};
use crate::timer::Countdown;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between match polls
    pub match_poll_interval: Duration,

    /// Interval between completion polls
    pub completion_poll_interval: Duration,

    /// How long the user has to confirm a match
    pub confirm_window: Duration,

    /// Progress reporting during the confirmation window
    pub countdown: Option<Countdown>,

    /// Give up waiting for a match after this long
    pub match_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            match_poll_interval: MATCH_POLL_INTERVAL,
            completion_poll_interval: COMPLETION_POLL_INTERVAL,
            confirm_window: CONFIRM_WINDOW,
            countdown: Some(Countdown::default()),
            match_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Create config builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.match_poll_interval.is_zero() || self.completion_poll_interval.is_zero() {
            return Err(Error::config("Poll intervals must be non-zero"));
        }

        if self.confirm_window.is_zero() {
            return Err(Error::config("Confirmation window must be non-zero"));
        }

        if let Some(countdown) = &self.countdown {
            if countdown.tick.is_zero() || countdown.tick >= self.confirm_window {
                return Err(Error::config(
                    "Countdown tick must be non-zero and shorter than the confirmation window",
                ));
            }
            if !countdown.decay.is_finite() || countdown.decay <= 0.0 {
                return Err(Error::config("Countdown decay must be positive"));
            }
        }

        if self.match_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::config("Match timeout must be non-zero"));
        }

        Ok(())
    }
}

/// Builder for SessionConfig
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        SessionConfigBuilder {
            config: SessionConfig::default(),
        }
    }

    /// Set match poll interval
    pub fn match_poll_interval(mut self, interval: Duration) -> Self {
        self.config.match_poll_interval = interval;
        self
    }

    /// Set completion poll interval
    pub fn completion_poll_interval(mut self, interval: Duration) -> Self {
        self.config.completion_poll_interval = interval;
        self
    }

    /// Set confirmation window
    pub fn confirm_window(mut self, window: Duration) -> Self {
        self.config.confirm_window = window;
        self
    }

    /// Set or disable countdown reporting
    pub fn countdown(mut self, countdown: Option<Countdown>) -> Self {
        self.config.countdown = countdown;
        self
    }

    /// Bound the time spent waiting for a match
    pub fn match_timeout(mut self, timeout: Duration) -> Self {
        self.config.match_timeout = Some(timeout);
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<SessionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
