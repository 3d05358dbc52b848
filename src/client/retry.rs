//! Retry logic with exponential backoff for transient API failures.
//!
//! Only network-level failures are retried: timeouts, refused connections,
//! DNS failures and errors while sending or reading. HTTP status errors and
//! malformed bodies are application errors and are surfaced immediately.
//!
//! # Delay Calculation
//!
//! ```text
//! delay = backoff_unit * backoff_base^attempt
//! ```
//!
//! where `attempt` is the 1-indexed attempt that just failed. With the
//! defaults (unit 1s, base 1.5, 5 attempts) the waits are 1.5s, 2.25s,
//! 3.375s and 5.06s, about 12.2s in total before giving up.
//!
//! # Example
//!
//! ```
//! use auto_tagger_core::client::{FailureType, RetryDecision, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::default();
//! match policy.should_retry(FailureType::Transient, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_millis(1500));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::time::Duration;

use tracing::debug;

/// Default total attempts per request (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default exponential backoff base.
pub const DEFAULT_BACKOFF_BASE: f64 = 1.5;

/// Default time unit the backoff base is raised against.
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Network-level failure that may succeed on retry.
    Transient,

    /// Failure that retrying will not fix.
    Permanent,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 5
/// - `backoff_base`: 1.5
/// - `backoff_unit`: 1 second
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base raised to the failed attempt number.
    backoff_base: f64,

    /// Duration multiplied by the exponential factor.
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with one-second backoff units.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, backoff_base: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Creates a policy with a custom max attempts, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Replaces the backoff time unit.
    #[must_use]
    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the configured backoff base.
    #[must_use]
    pub fn backoff_base(&self) -> f64 {
        self.backoff_base
    }

    /// Determines whether to retry after a failed attempt.
    ///
    /// `attempt` is the attempt number that just failed (1-indexed).
    #[must_use]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.delay_for(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Delay to wait after the given failed attempt: `unit * base^attempt`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let nanos = self.backoff_unit.as_nanos() as f64 * self.backoff_base.powi(exponent);
        if !nanos.is_finite() || nanos < 0.0 {
            return self.backoff_unit;
        }
        // Saturates rather than overflowing for absurd base/attempt combinations
        if nanos >= u64::MAX as f64 {
            return Duration::from_nanos(u64::MAX);
        }
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Sum of every delay the policy can incur before giving up.
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|attempt| self.delay_for(attempt)).sum()
    }
}

/// Classifies a reqwest error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout | Transient |
/// | Connect (refused, DNS) | Transient |
/// | Request send / body read | Transient |
/// | Builder (bad URL) | Permanent |
/// | Redirect loop | Permanent |
#[must_use]
pub fn classify_error(error: &reqwest::Error) -> FailureType {
    if error.is_builder() || error.is_redirect() {
        FailureType::Permanent
    } else {
        FailureType::Transient
    }
}
