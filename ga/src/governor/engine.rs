//! RequestGovernor implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::llm::{CompletionClient, LlmError, Message};

use super::clock::{Clock, TokioClock};
use super::config::{GovernorConfig, RetryPolicy};
use super::error::GovernorError;

/// Internal state protected by mutex
///
/// Holding the guard is what makes a submission "in flight".
struct GovernorState {
    /// Start of the most recent completion attempt
    last_request_at: Option<Instant>,
}

/// Outcome of a single completion attempt
#[derive(Debug)]
enum AttemptOutcome {
    Success(String),
    Retryable(LlmError),
    Fatal(LlmError),
}

impl From<Result<String, LlmError>> for AttemptOutcome {
    fn from(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) => AttemptOutcome::Success(text),
            Err(e) if e.is_retryable() => AttemptOutcome::Retryable(e),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    submissions: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Snapshot of governor activity since creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GovernorStats {
    pub submissions: u64,
    pub attempts: u64,
    pub retries: u64,
    pub failures: u64,
}

/// Serializes and paces every call to the completion service
///
/// One instance is shared process-wide. A submission holds the lock for its
/// whole throttle wait and attempt loop, including backoff sleeps, so calls
/// leave in strict arrival order and never overlap.
pub struct RequestGovernor {
    client: CompletionClient,
    policy: RetryPolicy,
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<GovernorState>,
    counters: Counters,
}

impl RequestGovernor {
    /// Create a governor on the tokio clock
    pub fn new(client: CompletionClient, config: &GovernorConfig) -> Self {
        debug!(?config, "RequestGovernor::new: called");
        Self::with_clock(client, config.retry_policy(), config.min_interval(), Arc::new(TokioClock))
    }

    /// Create a governor with an explicit policy and clock
    pub fn with_clock(
        client: CompletionClient,
        policy: RetryPolicy,
        min_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            policy,
            min_interval,
            clock,
            state: Mutex::new(GovernorState { last_request_at: None }),
            counters: Counters::default(),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn stats(&self) -> GovernorStats {
        GovernorStats {
            submissions: self.counters.submissions.load(Ordering::Relaxed),
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Send a thread to the completion service and return the reply text
    pub async fn submit(&self, thread: &[Message], cancel: &CancellationToken) -> Result<String, GovernorError> {
        debug!(message_count = thread.len(), "RequestGovernor::submit: called");
        self.counters.submissions.fetch_add(1, Ordering::Relaxed);

        let result = self.submit_exclusive(thread, cancel).await;
        if result.is_err() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn submit_exclusive(&self, thread: &[Message], cancel: &CancellationToken) -> Result<String, GovernorError> {
        let mut state = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("RequestGovernor::submit: cancelled while queued");
                return Err(GovernorError::Cancelled);
            }
            guard = self.state.lock() => guard,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.throttle(&state, cancel).await?;

            state.last_request_at = Some(self.clock.now());
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);
            debug!(attempt, max_attempts = self.policy.max_attempts, "RequestGovernor::submit: sending");

            let outcome: AttemptOutcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempt, "RequestGovernor::submit: cancelled during call");
                    return Err(GovernorError::Cancelled);
                }
                result = self.client.call(thread) => result.into(),
            };

            match outcome {
                AttemptOutcome::Success(text) => {
                    debug!(attempt, reply_len = text.len(), "RequestGovernor::submit: success");
                    return Ok(text);
                }
                AttemptOutcome::Fatal(LlmError::EmptyResponse) => {
                    error!(attempt, "Completion service returned an empty reply");
                    return Err(GovernorError::EmptyResponse);
                }
                AttemptOutcome::Fatal(e) => {
                    error!(attempt, error = %e, "Completion request failed, not retrying");
                    return Err(GovernorError::Fatal(e));
                }
                AttemptOutcome::Retryable(e) if attempt >= self.policy.max_attempts => {
                    error!(attempts = attempt, error = %e, "Completion request failed on every attempt");
                    return Err(GovernorError::ExhaustedRetries { attempts: attempt, last: e });
                }
                AttemptOutcome::Retryable(e) => {
                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        status = ?e.status(),
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        ?backoff,
                        "Completion service returned a retryable error, waiting before retry"
                    );
                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    self.pause(backoff, cancel).await?;
                }
            }
        }
    }

    /// Hold the caller until the minimum spacing since the last start has passed
    async fn throttle(&self, state: &GovernorState, cancel: &CancellationToken) -> Result<(), GovernorError> {
        let Some(last) = state.last_request_at else {
            return Ok(());
        };

        let elapsed = self.clock.now().saturating_duration_since(last);
        match self.min_interval.checked_sub(elapsed) {
            Some(wait) if !wait.is_zero() => {
                debug!(?wait, "RequestGovernor::throttle: waiting before sending request");
                self.pause(wait, cancel).await
            }
            _ => Ok(()),
        }
    }

    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> Result<(), GovernorError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(?duration, "RequestGovernor::pause: cancelled");
                Err(GovernorError::Cancelled)
            }
            _ = self.clock.sleep(duration) => Ok(()),
        }
    }
}
