//! Retry/backoff schedule for transient remote failures, narrowed to the
//! one exponential shape `gatesync_core::config::RetryConfig` exposes (no
//! linear/constant variants, no jitter knob — those were never wired into
//! the run config this crate reads from).

use gatesync_core::config::RetryConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base: Duration,
    multiplier: f64,
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base: Duration, multiplier: f64, max_retries: u32) -> Self {
        Self { base, multiplier, max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// `base * multiplier^attempt`, attempt is zero-based.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        #[allow(clippy::cast_possible_wrap)]
        let factor = self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(self.base.as_secs_f64() * factor)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self::new(Duration::from_secs(cfg.base_secs), cfg.multiplier, cfg.max_retries)
    }
}
