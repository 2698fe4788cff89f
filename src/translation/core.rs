/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which sends text and
 * figure chunks to a provider as stateless structured-generation requests
 * and retries them while the service reports rate limiting.
 */

use log::debug;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::app_config::ModelId;
use crate::document::model::Figure;
use crate::errors::TranslationError;
use crate::providers::{GenerationRequest, GenerationResponse, Payload, Provider, ResponseSchema};
use crate::translation::prompts::{FIGURE_INSTRUCTION, TEXT_INSTRUCTION};
use crate::translation::retry::{AttemptOutcome, RetryPolicy};
use crate::translation::schema::{
    ImageTranslationPair, decode_image_translations, decode_translation_result,
};

/// Token usage statistics for tracking API consumption
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of requests sent, retries included
    pub requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
        }
    }

    /// Add token usage numbers reported by the service
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self, model: &ModelId) -> String {
        format!(
            "Token Usage Summary:\n\
             Model: {}\n\
             Requests: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64() / 60.0,
            self.tokens_per_minute()
        )
    }
}

/// Translation service for text and figure chunks
///
/// Every call is independent: no context is carried from one chunk to the
/// next. Only usage accounting is shared.
#[derive(Debug)]
pub struct TranslationService<P: Provider> {
    provider: P,
    retry: RetryPolicy,
    token_stats: Mutex<TokenUsageStats>,
}

impl<P: Provider> TranslationService<P> {
    pub fn new(provider: P, retry: RetryPolicy) -> Self {
        Self {
            provider,
            retry,
            token_stats: Mutex::new(TokenUsageStats::new()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Snapshot of the usage recorded so far
    pub fn token_usage(&self) -> TokenUsageStats {
        self.token_stats.lock().clone()
    }

    /// Translate one text chunk
    pub async fn translate_text(&self, text: &str, model: &ModelId) -> Result<String, TranslationError> {
        let request = GenerationRequest {
            model: model.as_str().to_string(),
            instruction: TEXT_INSTRUCTION.to_string(),
            payload: Payload::Text(text.to_string()),
            schema: ResponseSchema::TranslationResult,
        };
        let result = self.execute("translate_text", request, decode_translation_result).await?;
        Ok(result.translated_text)
    }

    /// Read and translate the text of one figure, in the order returned
    pub async fn translate_figure(
        &self,
        figure: &Figure,
        model: &ModelId,
    ) -> Result<Vec<ImageTranslationPair>, TranslationError> {
        let request = GenerationRequest {
            model: model.as_str().to_string(),
            instruction: FIGURE_INSTRUCTION.to_string(),
            payload: Payload::Image {
                mime_type: figure.mime_type().to_string(),
                data: figure.bytes.clone(),
            },
            schema: ResponseSchema::ImageTranslationList,
        };
        self.execute("translate_figure", request, decode_image_translations).await
    }

    async fn execute<T>(
        &self,
        operation: &str,
        request: GenerationRequest,
        decode: fn(&str) -> Result<T, TranslationError>,
    ) -> Result<T, TranslationError> {
        self.retry
            .run(operation, || {
                let request = request.clone();
                async move {
                    let start = Instant::now();
                    let result = self.provider.complete(request).await;
                    self.record(start.elapsed(), result.as_ref().ok());

                    match self.retry.classify(result) {
                        AttemptOutcome::Success(response) => match decode(&response.text) {
                            Ok(value) => AttemptOutcome::Success(value),
                            Err(e) => AttemptOutcome::Fatal(e),
                        },
                        AttemptOutcome::Retryable(delay) => AttemptOutcome::Retryable(delay),
                        AttemptOutcome::Fatal(e) => AttemptOutcome::Fatal(e),
                    }
                }
            })
            .await
    }

    fn record(&self, elapsed: Duration, response: Option<&GenerationResponse>) {
        let mut stats = self.token_stats.lock();
        stats.requests += 1;
        stats.api_duration += elapsed;
        if let Some(response) = response {
            stats.add_token_usage(response.prompt_tokens, response.completion_tokens);
            debug!(
                "Request completed in {:?} ({:?} prompt / {:?} completion tokens)",
                elapsed, response.prompt_tokens, response.completion_tokens
            );
        }
    }
}
