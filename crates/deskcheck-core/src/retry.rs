//! Bounded retry with fixed or linear backoff.
//!
//! Applied only to the market price fetch, never to local scoring or
//! classification. Every loop has a hard attempt ceiling.

use std::time::Duration;

/// Backoff strategy between fetch attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed {
        /// Delay between retries.
        delay: Duration,
    },
    /// Delay grows linearly: `base * (attempt + 1)`.
    Linear {
        /// Delay before the first retry.
        base: Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Linear {
            base: Duration::from_millis(200),
        }
    }
}

impl Backoff {
    /// Delay for a given retry attempt (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Linear { base } => base.saturating_mul(attempt + 1),
        }
    }
}

/// Configuration for the fetch retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Backoff strategy between attempts.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn linear(base: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Linear { base },
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
