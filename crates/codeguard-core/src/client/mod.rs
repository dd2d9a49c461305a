//! Model client: one `complete(prompt)` call with bounded retry.
//!
//! The transport lives behind [`ModelBackend`], so the retry loop can be
//! driven by a scripted backend in tests.

pub mod openai;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiBackend;

/// A single failed request to the model backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// HTTP status when the backend answered, `None` for transport failures.
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn empty_response() -> Self {
        Self::transport("No response content received from the model")
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "model backend returned {}: {}", status, self.message),
            None => write!(f, "model backend request failed: {}", self.message),
        }
    }
}

impl std::error::Error for BackendError {}

/// The one operation the pipeline needs from an LLM backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Return the text of the single top completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// How a backend failure is treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Authentication,
    Permission,
    RateLimited,
    Server,
    Transient,
}

impl FailureClass {
    pub fn of(error: &BackendError) -> Self {
        match error.status {
            Some(401) => FailureClass::Authentication,
            Some(403) => FailureClass::Permission,
            Some(429) => FailureClass::RateLimited,
            Some(status) if status >= 500 => FailureClass::Server,
            _ => FailureClass::Transient,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureClass::Authentication | FailureClass::Permission)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureClass::Authentication => "authentication failure",
            FailureClass::Permission => "permission denied",
            FailureClass::RateLimited => "rate limited",
            FailureClass::Server => "server error",
            FailureClass::Transient => "request error",
        };
        f.write_str(label)
    }
}

/// Bounded retry with linear backoff for rate-limit and server failures and a
/// flat delay for everything else that is retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub flat_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            flat_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            flat_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based), or `None` when
    /// the failure must not be retried.
    pub fn delay_for(&self, class: FailureClass, attempt: u32) -> Option<Duration> {
        match class {
            FailureClass::Authentication | FailureClass::Permission => None,
            FailureClass::RateLimited | FailureClass::Server => {
                Some(self.base_delay.saturating_mul(attempt))
            }
            FailureClass::Transient => Some(self.flat_delay),
        }
    }
}

/// Terminal outcome of a call that did not produce text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("{class}, not retrying: {source}")]
    Fatal {
        class: FailureClass,
        source: BackendError,
    },

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: BackendError },
}

impl CallError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CallError::Fatal { .. })
    }

    pub fn backend_error(&self) -> &BackendError {
        match self {
            CallError::Fatal { source, .. } => source,
            CallError::Exhausted { last, .. } => last,
        }
    }
}

/// Retrying wrapper around a [`ModelBackend`]. Cheap to clone; clones share
/// the backend.
#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    policy: RetryPolicy,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Send `prompt` and return the model's text, retrying transient failures.
    pub async fn complete(&self, prompt: &str) -> Result<String, CallError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.backend.complete(prompt).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => BackendError::empty_response(),
                Err(e) => e,
            };

            let class = FailureClass::of(&error);
            let delay = match self.policy.delay_for(class, attempt) {
                Some(delay) => delay,
                None => {
                    tracing::error!("model call failed with {}: {}", class, error);
                    return Err(CallError::Fatal {
                        class,
                        source: error,
                    });
                }
            };

            if attempt >= max_attempts {
                tracing::warn!(
                    "model call failed after {} attempts ({}): {}",
                    attempt,
                    class,
                    error
                );
                return Err(CallError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            tracing::warn!(
                "model call {} (attempt {}/{}), retrying in {:?}",
                class,
                attempt,
                max_attempts,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays a script of responses, then falls back to a
    /// default answer. Records every prompt it receives.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String, BackendError>>>,
        fallback: Result<String, BackendError>,
        prompts: Mutex<Vec<String>>,
        call_times: Mutex<Vec<tokio::time::Instant>>,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<Result<String, BackendError>>) -> Self {
            Self::with_fallback(script, Err(BackendError::transport("script exhausted")))
        }

        pub fn with_fallback(
            script: Vec<Result<String, BackendError>>,
            fallback: Result<String, BackendError>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                prompts: Mutex::new(Vec::new()),
                call_times: Mutex::new(Vec::new()),
            }
        }

        pub fn always(response: Result<String, BackendError>) -> Self {
            Self::with_fallback(Vec::new(), response)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.call_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.call_times
                .lock()
                .unwrap()
                .push(tokio::time::Instant::now());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }
}
