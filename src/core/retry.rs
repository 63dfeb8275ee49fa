//! Retry policy, failure classification and per-call retry state

use std::time::Duration;

use crate::core::errors::TranslationError;

/// Default attempt ceiling for one translate call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default first backoff wait
pub const DEFAULT_BASE_DELAY_MS: u64 = 3000;

/// Why a failure is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// 429, quota or rate limiting
    RateLimited,
    /// 503, upstream overloaded
    Overloaded,
}

/// Outcome of the retryability decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryability {
    Transient(TransientKind),
    Terminal,
}

impl Retryability {
    pub fn is_transient(self) -> bool {
        matches!(self, Retryability::Transient(_))
    }
}

/// Decide whether a failure is transient.
///
/// A structured status code wins. Message text is only inspected when the
/// transport gave no status.
pub fn classify(status: Option<u16>, message: &str) -> Retryability {
    match status {
        Some(429) => Retryability::Transient(TransientKind::RateLimited),
        Some(503) => Retryability::Transient(TransientKind::Overloaded),
        Some(_) => Retryability::Terminal,
        None => {
            if message.contains("429") || message.contains("RESOURCE_EXHAUSTED") {
                Retryability::Transient(TransientKind::RateLimited)
            } else if message.contains("503") || message.contains("UNAVAILABLE") {
                Retryability::Transient(TransientKind::Overloaded)
            } else {
                Retryability::Terminal
            }
        }
    }
}

/// Retryability of an error produced by an attempt
pub fn classify_error(err: &TranslationError) -> Retryability {
    match err {
        TranslationError::RateLimited { .. } => Retryability::Transient(TransientKind::RateLimited),
        TranslationError::Overloaded { .. } => Retryability::Transient(TransientKind::Overloaded),
        TranslationError::Service { status, message } => classify(*status, message),
        _ => Retryability::Terminal,
    }
}

/// Exponential backoff without jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after a transient failure on `attempt` (1-based): `base * 2^(attempt-1)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Every wait the policy can schedule, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|n| self.backoff_delay(n)).collect()
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// State owned by a single translate call
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    last_error: Option<TranslationError>,
    next_wait: Option<Duration>,
    total_waited: Duration,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            last_error: None,
            next_wait: None,
            total_waited: Duration::ZERO,
        }
    }

    /// Current attempt number, 1-based
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn last_error(&self) -> Option<&TranslationError> {
        self.last_error.as_ref()
    }

    pub fn next_wait(&self) -> Option<Duration> {
        self.next_wait
    }

    pub fn total_waited(&self) -> Duration {
        self.total_waited
    }

    /// Record a failed attempt and decide the next transition
    pub fn on_failure(&mut self, err: TranslationError, policy: &RetryPolicy) -> RetryDecision {
        let retryability = classify_error(&err);
        self.last_error = Some(err);

        if retryability.is_transient() && self.attempt < policy.max_attempts {
            let wait = policy.backoff_delay(self.attempt);
            self.next_wait = Some(wait);
            RetryDecision::RetryAfter(wait)
        } else {
            self.next_wait = None;
            RetryDecision::GiveUp
        }
    }

    /// Move to the next attempt once the scheduled wait has elapsed
    pub fn advance(&mut self) {
        if let Some(wait) = self.next_wait.take() {
            self.total_waited += wait;
        }
        self.attempt += 1;
    }

    /// The error the call ends with.
    ///
    /// A `Service` error that classifies as transient is reported as its
    /// rate-limit or overload kind.
    pub fn into_error(self) -> TranslationError {
        match self.last_error {
            Some(TranslationError::Service { status, message }) => {
                TranslationError::from_status(status, message)
            }
            Some(err) => err,
            None => TranslationError::Service {
                status: None,
                message: "translation failed before any attempt completed".to_string(),
            },
        }
    }
}
