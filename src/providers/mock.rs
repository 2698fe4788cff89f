/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a schema-conforming answer
 * - `MockProvider::rate_limited(n, hint)` - Rejects the first `n` calls as over capacity
 * - `MockProvider::failing()` - Always fails with a non rate-limit error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, GenerationResponse, Payload, Provider, ResponseSchema};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper answer
    Working,
    /// Reports rate limiting for the first `times` calls, then works
    RateLimited {
        times: usize,
        retry_delay: Option<&'static str>,
    },
    /// Always fails with a server error
    Failing,
    /// Returns text that is not valid JSON
    Malformed,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of calls received
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&GenerationRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a provider that is over capacity for the first `times` calls
    pub fn rate_limited(times: usize, retry_delay: Option<&'static str>) -> Self {
        Self::new(MockBehavior::RateLimited { times, retry_delay })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers with invalid JSON
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&GenerationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Default answer: text is echoed with a `[JA]` prefix, images yield one pair
    pub fn default_response(request: &GenerationRequest) -> String {
        match (&request.schema, &request.payload) {
            (ResponseSchema::TranslationResult, Payload::Text(text)) => {
                json!({ "translated_text": format!("[JA] {}", text) }).to_string()
            }
            (ResponseSchema::TranslationResult, Payload::Image { .. }) => {
                json!({ "translated_text": "[JA] image" }).to_string()
            }
            (ResponseSchema::ImageTranslationList, _) => {
                json!([{ "original": "도 1", "translated": "図1" }]).to_string()
            }
        }
    }

    fn success(&self, request: &GenerationRequest) -> GenerationResponse {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => Self::default_response(request),
        };
        let prompt_tokens = match &request.payload {
            Payload::Text(t) => t.len() as u64,
            Payload::Image { data, .. } => data.len() as u64,
        };
        GenerationResponse {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(text.len() as u64),
            text,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.success(&request)),

            MockBehavior::RateLimited { times, retry_delay } => {
                if count < times {
                    Err(ProviderError::RateLimitExceeded {
                        message: format!("Simulated quota exhaustion (request #{})", count + 1),
                        retry_delay: retry_delay.map(str::to_string),
                    })
                } else {
                    Ok(self.success(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Malformed => Ok(GenerationResponse {
                text: "this is not json".to_string(),
                prompt_tokens: Some(0),
                completion_tokens: Some(0),
            }),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }
}
