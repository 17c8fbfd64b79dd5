//! Retry decisions for failed HTTP requests.
//!
//! The configuration only carries a [`RetryHandler`]; whoever executes
//! requests asks it whether a failed attempt should be repeated.

use std::error::Error as StdError;
use std::fmt;

/// Decides whether a failed request should be retried.
///
/// `execution_count` is the number of attempts made so far, starting at 1.
pub trait RetryHandler: Send + Sync {
    fn retry_request(&self, error: &(dyn StdError + 'static), execution_count: u32) -> bool;
}

impl<F> RetryHandler for F
where
    F: Fn(&(dyn StdError + 'static), u32) -> bool + Send + Sync,
{
    fn retry_request(&self, error: &(dyn StdError + 'static), execution_count: u32) -> bool {
        self(error, execution_count)
    }
}

/// Retries any failure until `max_retries` retries have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRetries {
    max_retries: u32,
}

impl MaxRetries {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for MaxRetries {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryHandler for MaxRetries {
    fn retry_request(&self, error: &(dyn StdError + 'static), execution_count: u32) -> bool {
        let retry = execution_count <= self.max_retries;
        tracing::trace!(execution_count, retry, "retry decision for: {error}");
        retry
    }
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRetry;

impl RetryHandler for NoRetry {
    fn retry_request(&self, _error: &(dyn StdError + 'static), _execution_count: u32) -> bool {
        false
    }
}

pub(crate) struct HandlerDebug<'a>(pub(crate) Option<&'a std::sync::Arc<dyn RetryHandler>>);

impl fmt::Debug for HandlerDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Some(<retry handler>)"),
            None => f.write_str("None"),
        }
    }
}
