//! Bounded polling loops
//!
//! Every call site reduces its result to a [`RetryOutcome`]; the loops here
//! decide whether to sleep and try again or give up. Deadlines are the only
//! form of cancellation.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tfcore::ResourceData;
use tokio::time::Instant;

use super::ProviderError;
use crate::api::ApiResponse;

/// Read timeout used by every resource package
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Attempts made by [`retry_when`]
pub const RETRY_WHEN_ATTEMPTS: u32 = 10;

const RETRY_WHEN_INTERVAL: Duration = Duration::from_secs(1);
const FIXED_INTERVAL: Duration = Duration::from_millis(500);
const LINEAR_STEP: Duration = Duration::from_secs(1);
const LINEAR_CAP: Duration = Duration::from_secs(10);

const WAIT_TIMEOUT_MESSAGE: &str = "timeout while waiting for state to become";

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    Retryable(ProviderError),
    NonRetryable(ProviderError),
}

impl<T> RetryOutcome<T> {
    pub fn retryable(err: impl Into<ProviderError>) -> Self {
        RetryOutcome::Retryable(err.into())
    }

    pub fn non_retryable(err: impl Into<ProviderError>) -> Self {
        RetryOutcome::NonRetryable(err.into())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RetryOutcome<U> {
        match self {
            RetryOutcome::Success(value) => RetryOutcome::Success(f(value)),
            RetryOutcome::Retryable(err) => RetryOutcome::Retryable(err),
            RetryOutcome::NonRetryable(err) => RetryOutcome::NonRetryable(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed,
    /// `attempt * interval`, never above `cap`
    Linear { cap: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub interval: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// 500ms between attempts
    pub fn fixed(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: FIXED_INTERVAL,
            backoff: Backoff::Fixed,
        }
    }

    /// 1s, 2s, 3s... capped at 10s
    pub fn linear(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: LINEAR_STEP,
            backoff: Backoff::Linear { cap: LINEAR_CAP },
        }
    }

    /// Sleep after the given 1-based attempt
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Linear { cap } => self.interval.saturating_mul(attempt).min(cap),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("{0}")]
    Failed(ProviderError),

    /// Deadline hit after at least one retryable failure
    #[error("{last}")]
    Timeout {
        timeout: Duration,
        last: ProviderError,
    },

    /// Deadline hit before any attempt reported back
    #[error("timeout while waiting for state to become 'success' (timeout: {timeout:?})")]
    WaitTimeout { timeout: Duration },

    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted { attempts: u32, last: ProviderError },
}

impl RetryError {
    pub fn last_error(&self) -> Option<&ProviderError> {
        match self {
            RetryError::Failed(last)
            | RetryError::Timeout { last, .. }
            | RetryError::Exhausted { last, .. } => Some(last),
            RetryError::WaitTimeout { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.last_error()
            .map(ProviderError::is_not_found)
            .unwrap_or(false)
    }
}

fn deadline_error(timeout: Duration, last: Option<ProviderError>) -> RetryError {
    match last {
        Some(last) => RetryError::Timeout { timeout, last },
        None => RetryError::WaitTimeout { timeout },
    }
}

/// Single pass of the bounded loop
///
/// Each invocation is cut off at the deadline. The loop never sleeps past it.
pub async fn retry_until<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RetryOutcome<T>>,
{
    let deadline = Instant::now() + policy.timeout;
    let mut attempt: u32 = 0;
    let mut last: Option<ProviderError> = None;

    loop {
        attempt += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());

        let outcome = match tokio::time::timeout(remaining, op()).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(deadline_error(policy.timeout, last)),
        };

        match outcome {
            RetryOutcome::Success(value) => return Ok(value),
            RetryOutcome::NonRetryable(err) => return Err(RetryError::Failed(err)),
            RetryOutcome::Retryable(err) => {
                tracing::debug!("Attempt {} failed, will retry: {}", attempt, err);
                last = Some(err);
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(deadline_error(policy.timeout, last));
        }
        tokio::time::sleep(policy.delay(attempt).min(remaining)).await;
        if Instant::now() >= deadline {
            return Err(deadline_error(policy.timeout, last));
        }
    }
}

/// Fixed-interval loop, restarted once after a wait timeout
///
/// TODO: the restart doubles the effective timeout; drop it once no resource
/// depends on the longer window.
pub async fn with_retries<T, F, Fut>(timeout: Duration, mut op: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RetryOutcome<T>>,
{
    match retry_until(RetryPolicy::fixed(timeout), &mut op).await {
        Err(err) if err.to_string().contains(WAIT_TIMEOUT_MESSAGE) => {
            tracing::warn!("Restarting retry loop after: {}", err);
            retry_until(RetryPolicy::fixed(timeout), &mut op).await
        }
        result => result,
    }
}

/// Read variant of [`with_retries`]
///
/// `op` fills in a copy of `data`; the copy replaces `data` on success. A
/// not-found answer ends the loop at once unless the resource was created in
/// this operation, and a final not-found clears the id instead of failing.
pub async fn with_retries_for_read<F, Fut>(
    data: &mut ResourceData,
    timeout: Duration,
    mut op: F,
) -> Result<(), RetryError>
where
    F: FnMut(ResourceData) -> Fut,
    Fut: Future<Output = RetryOutcome<ResourceData>>,
{
    let is_new = data.is_new_resource();
    let snapshot = data.clone();

    let result = with_retries(timeout, || {
        let attempt = op(snapshot.clone());
        async move {
            match attempt.await {
                RetryOutcome::Retryable(err) if !is_new && err.is_not_found() => {
                    RetryOutcome::NonRetryable(err)
                }
                other => other,
            }
        }
    })
    .await;

    match result {
        Ok(updated) => {
            *data = updated;
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!(
                "Resource {} not found, removing from state: {}",
                data.id(),
                err
            );
            data.clear_id();
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Retries while the failing response matches `should_retry`
///
/// Up to ten attempts one second apart; any other failure returns at once.
pub async fn retry_when<T, P, F, Fut>(
    should_retry: P,
    additional_codes: &[u16],
    mut op: F,
) -> Result<T, RetryError>
where
    P: Fn(&ApiResponse, &[u16]) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let retry = err
            .response()
            .map(|response| should_retry(response, additional_codes))
            .unwrap_or(false);
        if !retry {
            return Err(RetryError::Failed(err));
        }
        if attempt >= RETRY_WHEN_ATTEMPTS {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        tracing::warn!(
            "Retrying after attempt {}/{}: {}",
            attempt,
            RETRY_WHEN_ATTEMPTS,
            err
        );
        tokio::time::sleep(RETRY_WHEN_INTERVAL).await;
    }
}
