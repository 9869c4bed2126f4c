//! Retry configuration.

use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Deadline for each attempt. `None` lets an attempt run forever.
    pub attempt_timeout: Option<Duration>,
    /// Wait strategy between attempts.
    pub wait: WaitStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Some(Duration::from_secs(15)),
            wait: WaitStrategy::Fixed(Duration::from_millis(1500)),
        }
    }
}

impl RetryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt budget.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the per-attempt deadline.
    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Remove the per-attempt deadline.
    #[must_use]
    pub fn no_timeout(mut self) -> Self {
        self.attempt_timeout = None;
        self
    }

    /// Set the wait strategy.
    #[must_use]
    pub fn wait(mut self, strategy: WaitStrategy) -> Self {
        self.wait = strategy;
        self
    }

    /// Use fixed delay.
    #[must_use]
    pub fn fixed(mut self, delay: Duration) -> Self {
        self.wait = WaitStrategy::Fixed(delay);
        self
    }

    /// Use exponential backoff.
    #[must_use]
    pub fn exponential(mut self, initial: Duration, max: Duration) -> Self {
        self.wait = WaitStrategy::ExponentialBackoff {
            initial,
            max,
            multiplier: 2.0,
        };
        self
    }

    /// Settings for login and registration, where the backend may be cold:
    /// three attempts, 15 s each, 1.5 s apart.
    pub fn for_login() -> Self {
        Self::default()
    }

    /// Create config that never retries.
    pub fn no_retry() -> Self {
        Self::new().max_attempts(1)
    }
}

/// Strategy for waiting between retries.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitStrategy {
    /// No waiting.
    None,
    /// Fixed delay.
    Fixed(Duration),
    /// Exponential backoff.
    ExponentialBackoff {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
    },
}

impl WaitStrategy {
    /// Calculate the wait after the given failed attempt (1-indexed).
    pub fn calculate(&self, attempt: u32) -> Duration {
        match self {
            WaitStrategy::None => Duration::ZERO,
            WaitStrategy::Fixed(d) => *d,
            WaitStrategy::ExponentialBackoff {
                initial,
                max,
                multiplier,
            } => {
                let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let delay = initial.as_secs_f64() * multiplier.powi(exponent);
                Duration::from_secs_f64(delay.min(max.as_secs_f64()))
            }
        }
    }
}
