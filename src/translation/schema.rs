use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;
use crate::providers::ResponseSchema;

/// Structured answer of a text translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationResult {
    pub translated_text: String,
}

/// One text fragment found in a figure and its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageTranslationPair {
    pub original: String,
    pub translated: String,
}

/// Decode a `TranslationResult`, rejecting any other shape
pub fn decode_translation_result(raw: &str) -> Result<TranslationResult, TranslationError> {
    serde_json::from_str(raw.trim()).map_err(|e| TranslationError::SchemaMismatch {
        schema: ResponseSchema::TranslationResult.name(),
        reason: e.to_string(),
    })
}

/// Decode the ordered pair list of a figure translation
pub fn decode_image_translations(raw: &str) -> Result<Vec<ImageTranslationPair>, TranslationError> {
    serde_json::from_str(raw.trim()).map_err(|e| TranslationError::SchemaMismatch {
        schema: ResponseSchema::ImageTranslationList.name(),
        reason: e.to_string(),
    })
}
