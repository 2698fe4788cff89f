/*!
 * # Patent Translator
 *
 * A Rust library for translating Korean patent specifications (.docx) into
 * Japanese with a structured-generation AI service.
 *
 * ## Features
 *
 * - Extract body paragraphs and embedded drawings from .docx files
 * - Group content into word-bounded translation units, one unit per figure
 * - Translate text and drawing labels through the Gemini API with
 *   rate-limit backoff
 * - Assemble a Japanese .docx with `【NNNN】` paragraph numbering and
 *   east-Asian font settings
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and model registry
 * - `document`: Document handling:
 *   - `document::extractor`: Ordered content extraction
 *   - `document::assembler`: Output document and paragraph numbering
 *   - `document::writer`: .docx serialization
 * - `translation`: AI-powered translation services:
 *   - `translation::chunker`: Translation unit grouping
 *   - `translation::core`: Core translation functionality
 *   - `translation::retry`: Rate-limit retry state machine
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, ModelId, ModelInfo, ModelRegistry};
pub use app_controller::{Controller, PipelineRun, RunResult};
pub use document::{ContentElement, ContentExtractor, Figure, OutputDocument};
pub use errors::{AppError, ConfigError, DocumentError, ProviderError, TranslationError};
pub use translation::{Chunk, TranslationService, chunk_elements};
