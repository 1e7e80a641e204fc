//! Resilience patterns for reco-runtime.
//!
//! This module provides:
//! - Failure classification for provider errors
//! - Linear retry backoff, plugged into `backon`

mod classify;
mod retry;

pub use classify::{classify, FailureKind};
pub use retry::{LinearBackoff, RetryPolicy};
