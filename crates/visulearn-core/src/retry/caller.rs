//! Bounded retry around a single external call.

use crate::retry::policy::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};
use visulearn_abstraction::{Classify, FailureKind};

/// Result of one call, folded into a value.
///
/// Serialized as `{"status": ..., "value": ...}` so any `T` can be carried,
/// including scalars and strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CallOutcome<T> {
    /// The call produced a value.
    Success(T),
    /// The call failed.
    Failure {
        /// Classification of the failure.
        kind: FailureKind,
        /// Human-readable error message.
        message: String,
        /// Whether the failure was transient.
        retryable: bool,
    },
}

impl<T> CallOutcome<T> {
    /// Folds a result into an outcome.
    pub fn from_result<E: Classify + Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => {
                let kind = err.failure_kind();
                Self::Failure { kind, message: err.to_string(), retryable: kind.is_retryable() }
            }
        }
    }

    /// Returns true for `Success`.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the value, discarding failure details.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }
}

/// What a retried call ended with, and how many attempts it took.
#[derive(Debug)]
pub struct CallReport<T, E> {
    /// The final result.
    pub result: Result<T, E>,
    /// Number of attempts made, at least 1.
    pub attempts: u32,
}

/// Runs an operation until it succeeds, fails terminally or runs out of retries.
///
/// Only failures classified as [`FailureKind::RateLimited`] are retried. The
/// caller holds no state between calls, so a single instance can be shared
/// by every sub-task of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryingCaller {
    policy: RetryPolicy,
}

impl RetryingCaller {
    /// Create a caller with the given policy.
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy this caller applies.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` with retries and returns its final result.
    ///
    /// On exhaustion the error of the last attempt is returned.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        self.call_counted(operation).await.result
    }

    /// Like [`RetryingCaller::call`], also reporting the attempt count.
    pub async fn call_counted<T, E, F, Fut>(&self, mut operation: F) -> CallReport<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, max_attempts, "Call succeeded after retry");
                    }
                    return CallReport { result: Ok(value), attempts: attempt };
                }
                Err(err) => err,
            };

            let kind = err.failure_kind();
            if !kind.is_retryable() {
                warn!(attempt, max_attempts, kind = %kind, error = %err, "Call failed with non-retryable error");
                return CallReport { result: Err(err), attempts: attempt };
            }

            if attempt >= max_attempts {
                warn!(attempt, max_attempts, kind = %kind, error = %err, "Call failed, retries exhausted");
                return CallReport { result: Err(err), attempts: attempt };
            }

            let delay = self.policy.delay_for_retry(attempt - 1);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Rate limited, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs `operation` exactly once and folds the result.
    pub async fn attempt<T, E, F, Fut>(&self, operation: F) -> CallOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        CallOutcome::from_result(operation().await)
    }

    /// Runs `operation` with retries and folds the final result.
    pub async fn call_outcome<T, E, F, Fut>(&self, operation: F) -> CallOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        CallOutcome::from_result(self.call(operation).await)
    }
}
