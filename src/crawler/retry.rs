//! Bounded per-URL retry around a fetch
//!
//! A URL moves through `Attempting(0) .. Attempting(max_retries)` and ends
//! in either `Succeeded` or `FailedFatal`. Retries start immediately; the
//! fetcher's own delay is the only pacing between attempts.

use crate::crawler::fetcher::{Fetch, FetchError, PageRequest};

/// Position of one URL in its retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt `n` (zero-based) is in flight
    Attempting(u32),
    Succeeded,
    FailedFatal,
}

impl RetryState {
    /// Transition after a successful attempt
    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting(_) => Self::Succeeded,
            terminal => terminal,
        }
    }

    /// Transition after a failed attempt
    pub fn on_failure(self, error: &FetchError, max_retries: u32) -> Self {
        match self {
            Self::Attempting(n) if error.is_retryable() && n < max_retries => {
                Self::Attempting(n + 1)
            }
            Self::Attempting(_) => Self::FailedFatal,
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting(_))
    }
}

/// Runs a fetch until it succeeds or the retry budget is spent
#[derive(Debug, Clone, Copy)]
pub struct RetryingFetchStep {
    max_retries: u32,
}

impl RetryingFetchStep {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Fetches `request`, retrying retryable failures
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - Number of attempts it took, at most `max_retries + 1`
    /// * `Err(FetchError)` - The error of the final attempt
    pub async fn run<F>(&self, fetcher: &mut F, request: &PageRequest) -> Result<u32, FetchError>
    where
        F: Fetch + ?Sized,
    {
        let url = &request.url;
        let mut state = RetryState::Attempting(0);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let error = match fetcher.fetch(request).await {
                Ok(()) => {
                    state = state.on_success();
                    debug_assert_eq!(state, RetryState::Succeeded);
                    return Ok(attempts);
                }
                Err(e) => e,
            };

            tracing::error!("Crawling: [Error] {} {}", url, error);

            state = state.on_failure(&error, self.max_retries);
            match state {
                RetryState::Attempting(n) => {
                    tracing::info!(
                        "Crawling: [Retry] {} (retry {}/{})",
                        url,
                        n,
                        self.max_retries
                    );
                }
                _ => return Err(error),
            }
        }
    }
}
