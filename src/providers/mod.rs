/*!
 * Provider implementations for the translation service.
 *
 * This module contains the client abstraction used by the translation layer:
 * - Gemini: Google generative language API integration
 * - Mock: scriptable provider used by tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Output contract requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// `{"translated_text": string}`
    TranslationResult,
    /// `[{"original": string, "translated": string}, ...]`
    ImageTranslationList,
}

impl ResponseSchema {
    /// Schema name used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::TranslationResult => "TranslationResult",
            Self::ImageTranslationList => "ImageTranslationList",
        }
    }
}

/// Content sent after the instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text to translate
    Text(String),
    /// Encoded image bytes
    Image {
        /// MIME type of `data`, e.g. "image/png"
        mime_type: String,
        /// Raw encoded image
        data: Vec<u8>,
    },
}

/// A single structured generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// Instruction prompt
    pub instruction: String,
    /// Text or image content
    pub payload: Payload,
    /// Required response structure
    pub schema: ResponseSchema,
}

/// Raw answer of the model plus usage accounting
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// JSON text produced by the model
    pub text: String,
    /// Prompt tokens reported by the service
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the service
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// Implementations translate a [`GenerationRequest`] into a call against a
/// concrete service. Rate limiting must be reported as
/// [`ProviderError::RateLimitExceeded`] so the caller can back off.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<GenerationResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod gemini;
pub mod mock;
