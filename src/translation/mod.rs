/*!
 * Translation of extracted document content using AI providers.
 *
 * This module contains the translation side of the pipeline. It is split
 * into several submodules:
 *
 * - `chunker`: Grouping of content elements into translation units
 * - `core`: Translation service definition and usage accounting
 * - `retry`: Rate-limit retry state machine
 * - `schema`: Structured response types and strict decoding
 * - `prompts`: Fixed instruction templates
 */

// Re-export main types for easier usage
pub use self::chunker::{Chunk, FigureChunk, TextChunk, chunk_elements};
pub use self::core::{TokenUsageStats, TranslationService};
pub use self::retry::{AttemptOutcome, RetryPolicy};
pub use self::schema::{ImageTranslationPair, TranslationResult};

// Submodules
pub mod chunker;
pub mod core;
pub mod prompts;
pub mod retry;
pub mod schema;
