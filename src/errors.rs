/*!
 * Error types for the patent translator.
 *
 * This module contains custom error types for the different layers of the
 * pipeline (document handling, translation service, configuration),
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service is over capacity (HTTP 429 / RESOURCE_EXHAUSTED)
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the API
        message: String,
        /// Raw retry delay suggested by the service, e.g. "3s"
        retry_delay: Option<String>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether this error signals temporary over-capacity of the service
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

/// Errors that can occur while reading or writing word-processing documents
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The container could not be opened or written
    #[error("Package error: {0}")]
    Package(String),

    /// A document part is not well-formed XML
    #[error("XML error in {part}: {message}")]
    Xml {
        /// Part name inside the package
        part: String,
        /// Parser message
        message: String,
    },

    /// A required part is missing from the package
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// An embedded image could not be decoded
    #[error("Failed to decode embedded image {embed_id} ({part}): {reason}")]
    Decode {
        /// Relationship id referenced by the drawing
        embed_id: String,
        /// Part name of the image inside the package
        part: String,
        /// Decoder message
        reason: String,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Non rate-limit failure reported by the translation service
    #[error("Translation service error: {0}")]
    ServiceError(#[from] ProviderError),

    /// Rate limiting persisted beyond the retry budget
    #[error("Failed to execute {operation} after {attempts} attempts (rate limited)")]
    RetriesExhausted {
        /// Operation that was being retried
        operation: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// The service answered with JSON that does not match the requested schema
    #[error("Response does not match the {schema} schema: {reason}")]
    SchemaMismatch {
        /// Name of the expected schema
        schema: &'static str,
        /// Decoder message
        reason: String,
    },

    /// A retry delay hint could not be parsed
    #[error("Malformed retry delay hint: {0:?}")]
    MalformedRetryHint(String),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested model is not part of the registry
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A configuration value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document handling
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
