//! Retrying external calls with exponential backoff on rate limits.

pub mod caller;
pub mod policy;

pub use caller::{CallOutcome, CallReport, RetryingCaller};
pub use policy::{BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy};
