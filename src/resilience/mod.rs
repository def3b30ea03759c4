//! Resilience patterns for the LinkedIn client.
//!
//! Only rate-limited calls are retried; every other classified error fails fast.

mod retry;

pub use retry::{RetryAttempt, RetryConfig, RetryExecutor};
