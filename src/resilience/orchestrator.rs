use tracing::{info, warn};

use super::retry::{AttemptState, RetryPolicy, Transition};
use crate::drivers::BackendSet;
use crate::types::{BackendId, GenerationConfig, GenerationResult, Message};
use crate::{Error, ErrorContext, Result};

/// Runs prompts against an ordered list of backends with bounded retries.
///
/// Error kinds are not inspected when deciding to retry: configuration,
/// transport and backend failures all consume an attempt the same way.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    backends: BackendSet,
    policy: RetryPolicy,
}

impl Orchestrator {
    pub fn new(backends: BackendSet, policy: RetryPolicy) -> Self {
        Self { backends, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// Try each backend in `order` up to `retries + 1` times, returning the
    /// first success. Fails only with `AllBackendsExhausted`.
    pub async fn run(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
        order: &[BackendId],
        retries: u32,
    ) -> Result<GenerationResult> {
        if order.is_empty() {
            return Err(Error::AllBackendsExhausted {
                attempts: 0,
                last_error: Box::new(Error::configuration_with_context(
                    "no backends to try",
                    ErrorContext::new()
                        .with_field_path("backend_order")
                        .with_source("orchestrator"),
                )),
            });
        }

        let mut state = AttemptState::start();
        let mut attempts = 0u32;

        loop {
            let backend_id = order[state.backend_index];
            attempts += 1;

            let outcome = self.attempt(backend_id, messages, config).await;
            let err = match outcome {
                Ok(result) => {
                    if attempts > 1 {
                        info!(
                            backend = %backend_id,
                            attempt = state.attempt_number(),
                            total_attempts = attempts,
                            "generation succeeded after earlier failures"
                        );
                    }
                    return Ok(result);
                }
                Err(e) => e,
            };

            warn!(
                backend = %backend_id,
                attempt = state.attempt_number(),
                max_attempts = retries + 1,
                error = %err,
                "generation attempt failed"
            );

            match state.on_failure(retries, order.len(), &self.policy) {
                Transition::Retry { next, delay } => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    state = next;
                }
                Transition::Fallback { next } => {
                    info!(
                        from = %backend_id,
                        to = %order[next.backend_index],
                        "backend exhausted, falling back"
                    );
                    state = next;
                }
                Transition::Exhausted => {
                    return Err(Error::AllBackendsExhausted {
                        attempts,
                        last_error: Box::new(err),
                    });
                }
            }
        }
    }

    async fn attempt(
        &self,
        backend_id: BackendId,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let backend = self.backends.get(backend_id).ok_or_else(|| {
            Error::configuration_with_context(
                format!("backend '{}' is not registered", backend_id),
                ErrorContext::new().with_source("orchestrator"),
            )
        })?;
        backend.complete(messages, &config.for_backend(backend_id)).await
    }
}
