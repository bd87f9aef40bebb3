//! Bounded polling waits.
//!
//! Everything a walkthrough blocks on goes through these combinators: a
//! condition closure polled at a fixed interval under a hard deadline.
//! [`wait_for_stable`] extends the idea to settling, where a sampled value
//! must hold steady for a run of consecutive samples instead of merely
//! becoming true once.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Default ceiling for a single wait (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval between condition checks (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout and poll interval for a wait operation.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often the condition is re-checked.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout with the default poll interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Settle condition: a sampled value must repeat for a number of
/// consecutive samples before the deadline.
#[derive(Debug, Clone, Copy)]
pub struct Quiescence {
    /// Consecutive identical samples required.
    pub stable_samples: u32,

    /// Interval between samples.
    pub sample_interval: Duration,

    /// Hard cap on the whole settle wait.
    pub timeout: Duration,
}

impl Quiescence {
    /// True when the required run of samples can complete inside the timeout.
    pub fn is_satisfiable(&self) -> bool {
        self.stable_samples >= 1
            && self.sample_interval > Duration::ZERO
            && self.sample_interval * (self.stable_samples - 1) < self.timeout
    }
}

impl Default for Quiescence {
    fn default() -> Self {
        Self {
            stable_samples: 5,
            sample_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Waits for a boolean condition, with timeout.
///
/// The condition is polled at `poll_interval` until it returns true or the
/// deadline expires.
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Waits for a fallible condition.
///
/// A condition that errors is treated as transiently false and retried
/// until the deadline; only the timeout itself is surfaced.
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        if let Ok(true) = condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Samples a value until it holds steady for the configured run of samples.
///
/// A sample that errors resets the streak: stability cannot be claimed
/// across a gap we failed to observe. The hard timeout bounds the whole
/// operation, so a value that never stops changing still terminates.
pub async fn wait_for_stable<T, F, Fut>(sample: F, quiescence: Quiescence, description: &str) -> Result<()>
where
    T: PartialEq,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let mut last: Option<T> = None;
    let mut streak: u32 = 0;

    loop {
        match sample().await {
            Ok(value) => {
                if last.as_ref() == Some(&value) {
                    streak += 1;
                } else {
                    streak = 1;
                    last = Some(value);
                }

                if streak >= quiescence.stable_samples {
                    return Ok(());
                }
            }
            Err(_) => {
                streak = 0;
                last = None;
            }
        }

        if start.elapsed() >= quiescence.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: quiescence.timeout,
            });
        }

        sleep(quiescence.sample_interval).await;
    }
}
