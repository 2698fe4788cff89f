/*!
 * Bounded retry loop for rate-limited service calls.
 *
 * Each attempt is classified as an [`AttemptOutcome`]; only `Retryable`
 * outcomes are retried, after sleeping for the delay they carry.
 */

use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::errors::{ProviderError, TranslationError};

static RETRY_DELAY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*s\s*$").unwrap());

/// Result of a single attempt
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    /// Service over capacity, retry after the delay
    Retryable(Duration),
    Fatal(TranslationError),
}

/// Attempt budget and fallback delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TranslationCommonConfig::default())
    }
}

impl From<&TranslationCommonConfig> for RetryPolicy {
    fn from(config: &TranslationCommonConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            default_delay: Duration::from_secs(config.default_retry_delay_secs),
        }
    }
}

/// Parse a service retry hint such as `"3s"` or `"1.5s"`
pub fn parse_retry_delay(hint: &str) -> Result<Duration, TranslationError> {
    RETRY_DELAY_REGEX
        .captures(hint)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| TranslationError::MalformedRetryHint(hint.to_string()))
}

impl RetryPolicy {
    /// Delay to wait after a rate-limit answer carrying `hint`
    pub fn delay_for(&self, hint: Option<&str>) -> Duration {
        match hint.map(parse_retry_delay) {
            Some(Ok(delay)) => delay,
            Some(Err(e)) => {
                warn!("{}, using default delay of {:?}", e, self.default_delay);
                self.default_delay
            }
            None => self.default_delay,
        }
    }

    /// Classify a provider result
    pub fn classify<T>(&self, result: Result<T, ProviderError>) -> AttemptOutcome<T> {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(ProviderError::RateLimitExceeded { message, retry_delay }) => {
                let delay = self.delay_for(retry_delay.as_deref());
                debug!("Rate limited: {}", message);
                AttemptOutcome::Retryable(delay)
            }
            Err(e) => AttemptOutcome::Fatal(TranslationError::ServiceError(e)),
        }
    }

    /// Run `attempt` until it succeeds, fails fatally, or the budget is spent
    ///
    /// No sleep follows the last attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        for i in 1..=self.max_retries {
            debug!("Attempt {}/{} for {}", i, self.max_retries, operation);
            match attempt().await {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Fatal(e) => {
                    error!("{} failed: {}", operation, e);
                    return Err(e);
                }
                AttemptOutcome::Retryable(delay) => {
                    if i < self.max_retries {
                        warn!(
                            "Rate limited on {} (attempt {}/{}), retrying in {:.1}s",
                            operation,
                            i,
                            self.max_retries,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        error!("{} still rate limited after {} attempts", operation, self.max_retries);
        Err(TranslationError::RetriesExhausted {
            operation: operation.to_string(),
            attempts: self.max_retries,
        })
    }
}
