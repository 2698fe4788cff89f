use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, GenerationResponse, Payload, Provider, ResponseSchema};

/// Type URL of the retry hint detail in Google RPC error bodies
const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

/// Gemini client for the generative language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Sampling temperature
    temperature: f32,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

/// generateContent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u64>,
    #[serde(default)]
    candidates_token_count: Option<u64>,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration, temperature: f32) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            temperature,
        }
    }

    fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url(), model)
    }

    /// Build the JSON body of a generateContent call
    pub fn build_request_body(request: &GenerationRequest, temperature: f32) -> Value {
        let payload_part = match &request.payload {
            Payload::Text(text) => json!({ "text": text }),
            Payload::Image { mime_type, data } => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": STANDARD.encode(data),
                }
            }),
        };

        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": request.instruction },
                    payload_part,
                ]
            }],
            "generationConfig": {
                "temperature": temperature,
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(request.schema),
            }
        })
    }

    /// OpenAPI-style schema passed to the service for structured output
    pub fn response_schema(schema: ResponseSchema) -> Value {
        match schema {
            ResponseSchema::TranslationResult => json!({
                "type": "OBJECT",
                "properties": {
                    "translated_text": { "type": "STRING" }
                },
                "required": ["translated_text"]
            }),
            ResponseSchema::ImageTranslationList => json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "original": { "type": "STRING" },
                        "translated": { "type": "STRING" }
                    },
                    "required": ["original", "translated"]
                }
            }),
        }
    }

    /// Map a non-success HTTP answer to a provider error
    ///
    /// Over-capacity answers (HTTP 429 or a `RESOURCE_EXHAUSTED` status) become
    /// [`ProviderError::RateLimitExceeded`] carrying the raw `retryDelay` hint.
    pub fn parse_error_body(http_status: u16, body: &str) -> ProviderError {
        let envelope = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope,
            Err(_) => {
                return match http_status {
                    429 => ProviderError::RateLimitExceeded {
                        message: body.to_string(),
                        retry_delay: None,
                    },
                    401 | 403 => ProviderError::AuthenticationError(body.to_string()),
                    _ => ProviderError::ApiError {
                        status_code: http_status,
                        message: body.to_string(),
                    },
                };
            }
        };

        let err = envelope.error;
        let code = err.code.unwrap_or(http_status);
        let exhausted = err.status.as_deref() == Some("RESOURCE_EXHAUSTED");

        if code == 429 || http_status == 429 || exhausted {
            let retry_delay = err
                .details
                .iter()
                .find(|d| d.get("@type").and_then(Value::as_str) == Some(RETRY_INFO_TYPE))
                .and_then(|d| d.get("retryDelay"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return ProviderError::RateLimitExceeded {
                message: err.message,
                retry_delay,
            };
        }

        match code {
            401 | 403 => ProviderError::AuthenticationError(err.message),
            _ => ProviderError::ApiError {
                status_code: code,
                message: err.message,
            },
        }
    }

    /// Extract the generated text and usage from a success body
    pub fn parse_success_body(body: &str) -> Result<GenerationResponse, ProviderError> {
        let response: GenerateContentResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid generateContent response: {}", e)))?;

        let text: String = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let feedback = response
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ProviderError::ParseError(format!("Empty model response ({})", feedback)));
        }

        let usage = response.usage_metadata;
        Ok(GenerationResponse {
            text,
            prompt_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
            completion_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
        })
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = self.generate_url(&request.model);
        let body = Self::build_request_body(&request, self.temperature);
        debug!("Sending {} request to {}", request.schema.name(), url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(format!("Failed to reach Gemini API: {}", e))
                } else {
                    ProviderError::RequestFailed(format!("Failed to send request to Gemini API: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Gemini API response: {}", e)))?;

        if !status.is_success() {
            let err = Self::parse_error_body(status.as_u16(), &text);
            if !err.is_rate_limit() {
                error!("Gemini API error ({}): {}", status, text);
            }
            return Err(err);
        }

        Self::parse_success_body(&text)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v1beta/models", self.base_url());
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(Self::parse_error_body(status.as_u16(), &text))
    }
}
