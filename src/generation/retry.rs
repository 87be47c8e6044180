//! Bounded retry state machine
//!
//! ```text
//!  Attempting(1) --ok--> Succeeded
//!       | err, 1 < max: wait base*1
//!       v
//!  Attempting(2) --ok--> Succeeded
//!       | err, n == max
//!       v
//!     Failed
//! ```

use std::time::Duration;

/// How many times to call the provider and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. At least 1.
    pub max_attempts: u32,
    /// Wait after attempt `n` fails is `base_delay * n`.
    pub base_delay: Duration,
    /// Upper bound on a single provider call.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            attempt_timeout,
        }
    }

    /// Wait before the attempt that follows failed attempt `attempt`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// About to make attempt `n` (1-based).
    Attempting(u32),
    Succeeded,
    Failed,
}

impl AttemptState {
    pub fn initial() -> Self {
        Self::Attempting(1)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting(_) => Self::Succeeded,
            terminal => terminal,
        }
    }

    /// Next state after the current attempt failed, and how long to wait
    /// before entering it.
    pub fn on_failure(self, policy: &RetryPolicy) -> (Self, Option<Duration>) {
        match self {
            Self::Attempting(n) if n < policy.max_attempts => {
                (Self::Attempting(n + 1), Some(policy.backoff_after(n)))
            }
            Self::Attempting(_) => (Self::Failed, None),
            terminal => (terminal, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.backoff_after(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(2000));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        let (next, wait) = AttemptState::initial().on_failure(&policy);
        assert_eq!(next, AttemptState::Failed);
        assert_eq!(wait, None);
    }

    #[test]
    fn test_transitions_with_two_attempts() {
        let policy = RetryPolicy::default();
        let state = AttemptState::initial();
        assert_eq!(state, AttemptState::Attempting(1));

        let (state, wait) = state.on_failure(&policy);
        assert_eq!(state, AttemptState::Attempting(2));
        assert_eq!(wait, Some(Duration::from_millis(1000)));

        let (state, wait) = state.on_failure(&policy);
        assert_eq!(state, AttemptState::Failed);
        assert_eq!(wait, None);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_success_is_terminal() {
        let policy = RetryPolicy::default();
        let state = AttemptState::Attempting(2).on_success();
        assert_eq!(state, AttemptState::Succeeded);
        assert_eq!(state.on_failure(&policy), (AttemptState::Succeeded, None));
        assert_eq!(AttemptState::Failed.on_success(), AttemptState::Failed);
    }
}
