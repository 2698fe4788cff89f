/*!
 * Tests for configuration loading, validation and the model registry
 */

use patent_translator::app_config::{
    Config, FigureDecodePolicy, GENERATED_MAX_WORDS, LogLevel, ModelInfo, ModelRegistry,
};
use patent_translator::errors::ConfigError;
use std::fs;

use crate::common::create_temp_dir;

fn model(id: &str, recommended: bool) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: String::new(),
        recommended,
    }
}

#[test]
fn test_defaultConfig_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.chunking.max_words, GENERATED_MAX_WORDS);
    assert_eq!(config.translation.common.max_retries, 5);
    assert_eq!(config.translation.common.default_retry_delay_secs, 10);
    assert_eq!(config.document.figure_decode_policy, FigureDecodePolicy::Abort);
    assert_eq!(config.translation.active_model().unwrap().as_str(), "gemini-2.5-flash");
}

#[test]
fn test_defaultRegistry_shouldHaveOneRecommendedModel() {
    let registry = ModelRegistry::default();
    assert!(!registry.is_empty());
    assert_eq!(registry.iter().filter(|m| m.recommended).count(), 1);
    assert_eq!(registry.recommended().map(|m| m.id.as_str()), Some("gemini-2.5-flash"));
}

#[test]
fn test_lookup_withUnknownModel_shouldFailClosed() {
    let registry = ModelRegistry::default();
    match registry.lookup("gpt-4o") {
        Err(ConfigError::UnknownModel(id)) => assert_eq!(id, "gpt-4o"),
        other => panic!("expected UnknownModel, got {:?}", other),
    }
    assert!(registry.get("gpt-4o").is_none());
}

#[test]
fn test_selectModel_shouldOnlyAcceptRegisteredIds() {
    let mut config = Config::default();
    config.translation.select_model("gemini-2.5-pro").unwrap();
    assert_eq!(config.translation.model, "gemini-2.5-pro");

    assert!(config.translation.select_model("gemini-1.0-ultra").is_err());
    assert_eq!(config.translation.model, "gemini-2.5-pro");
}

#[test]
fn test_validate_withDefaultModelOutsideRegistry_shouldFail() {
    let mut config = Config::default();
    config.translation.models = ModelRegistry::new(vec![model("only-model", true)]);
    assert!(matches!(config.validate(), Err(ConfigError::UnknownModel(_))));

    config.translation.model = "only-model".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withDuplicateOrEmptyRegistry_shouldFail() {
    let mut config = Config::default();
    config.translation.model = "a".to_string();

    config.translation.models = ModelRegistry::new(vec![model("a", true), model("a", false)]);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    config.translation.models = ModelRegistry::new(vec![]);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOutOfRangeValues_shouldFail() {
    let mut config = Config::default();
    config.chunking.max_words = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.translation.common.max_retries = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.document.font_size_pt = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_fromFile_withoutChunkingSection_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(&path, r#"{"translation": {}}"#).unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_fromFile_withMinimalConfig_shouldApplyDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(
        &path,
        r#"{"translation": {"model": "gemini-2.5-pro"}, "chunking": {"max_words": 200}, "document": {"figure_decode_policy": "skip"}, "log_level": "debug"}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.chunking.max_words, 200);
    assert_eq!(config.translation.model, "gemini-2.5-pro");
    assert_eq!(config.translation.models.len(), ModelRegistry::default().len());
    assert_eq!(config.document.figure_decode_policy, FigureDecodePolicy::Skip);
    assert_eq!(config.document.font_name, "MS Mincho");
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_saveThenLoad_shouldKeepRegistryEntries() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.translation.models = ModelRegistry::new(vec![model("m1", false), model("m2", true)]);
    config.translation.model = "m2".to_string();

    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.translation.models, config.translation.models);
    assert_eq!(loaded.translation.active_model().unwrap().as_str(), "m2");
}
