use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation service config
    pub translation: TranslationConfig,

    /// Chunking config. Has no default on purpose: the word budget must be
    /// written in the config file.
    pub chunking: ChunkingConfig,

    /// Input/output document settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One entry of the model allow-list
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier sent to the service (e.g. "gemini-2.5-flash")
    pub id: String,

    /// Human readable name
    pub name: String,

    /// Short description shown in model listings
    #[serde(default)]
    pub description: String,

    /// Whether this model is the recommended choice
    #[serde(default)]
    pub recommended: bool,
}

/// Validated model identifier.
///
/// Only obtainable through [`ModelRegistry::lookup`], so every `ModelId`
/// handed to the translation client names a registered model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId(String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enumerated registry of the models a run may use
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct ModelRegistry {
    models: Vec<ModelInfo>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    /// Resolve an identifier, failing closed for anything not registered
    pub fn lookup(&self, id: &str) -> Result<ModelId, ConfigError> {
        self.get(id)
            .map(|info| ModelId(info.id.clone()))
            .ok_or_else(|| ConfigError::UnknownModel(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelInfo> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// First model flagged as recommended, if any
    pub fn recommended(&self) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.recommended)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("model registry is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if model.id.trim().is_empty() {
                return Err(ConfigError::Invalid("model id cannot be empty".to_string()));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate model id: {}", model.id)));
            }
        }
        Ok(())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(vec![
            ModelInfo {
                id: "gemini-2.5-pro".to_string(),
                name: "Gemini 2.5 Pro".to_string(),
                description: "Highest quality and reasoning. Suited to very complex or nuanced translations and in-depth image analysis.".to_string(),
                recommended: false,
            },
            ModelInfo {
                id: "gemini-2.5-flash".to_string(),
                name: "Gemini 2.5 Flash".to_string(),
                description: "Best balance of quality, speed and cost. Ideal for Korean-Japanese patent translation and drawing OCR.".to_string(),
                recommended: true,
            },
            ModelInfo {
                id: "gemini-2.0-flash".to_string(),
                name: "Gemini 2.0 Flash".to_string(),
                description: "Fast and stable previous-generation model for routine translation work.".to_string(),
                recommended: false,
            },
        ])
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model used for every request of a run
    #[serde(default = "default_model")]
    pub model: String,

    /// Allow-list of selectable models
    #[serde(default)]
    pub models: ModelRegistry,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retry settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl TranslationConfig {
    /// Resolve the configured model against the registry
    pub fn active_model(&self) -> Result<ModelId, ConfigError> {
        self.models.lookup(&self.model)
    }

    /// Switch the active model, rejecting unregistered identifiers
    pub fn select_model(&mut self, model: &str) -> Result<(), ConfigError> {
        let id = self.models.lookup(model)?;
        self.model = id.as_str().to_string();
        Ok(())
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            models: ModelRegistry::default(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            common: TranslationCommonConfig::default(),
        }
    }
}

/// Retry settings shared by text and figure requests
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationCommonConfig {
    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay used when a rate-limit response carries no usable hint
    #[serde(default = "default_retry_delay_secs")]
    pub default_retry_delay_secs: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            default_retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChunkingConfig {
    /// Word budget per translation unit (whitespace-delimited tokens)
    pub max_words: usize,
}

/// What to do with an embedded image that cannot be decoded
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FigureDecodePolicy {
    /// Abort the extraction
    #[default]
    Abort,
    /// Log a warning and drop the figure
    Skip,
}

/// Document settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Handling of undecodable figures
    #[serde(default)]
    pub figure_decode_policy: FigureDecodePolicy,

    /// Base font of the output document
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// Font mapped to east-Asian glyphs
    #[serde(default = "default_east_asia_font")]
    pub east_asia_font: String,

    /// Base font size in points
    #[serde(default = "default_font_size_pt")]
    pub font_size_pt: f32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            figure_decode_policy: FigureDecodePolicy::default(),
            font_name: default_font_name(),
            east_asia_font: default_east_asia_font(),
            font_size_pt: default_font_size_pt(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Word budget written into freshly generated config files
pub const GENERATED_MAX_WORDS: usize = 2000;

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_font_name() -> String {
    "MS Mincho".to_string()
}

fn default_east_asia_font() -> String {
    "ＭＳ 明朝".to_string()
}

fn default_font_size_pt() -> f32 {
    10.5
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.translation.models.validate()?;

        // The default model must be part of the allow-list
        self.translation.active_model()?;

        if self.chunking.max_words == 0 {
            return Err(ConfigError::Invalid("chunking.max_words must be greater than 0".to_string()));
        }
        if self.translation.common.max_retries == 0 {
            return Err(ConfigError::Invalid("translation.common.max_retries must be at least 1".to_string()));
        }
        if self.translation.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("translation.endpoint cannot be empty".to_string()));
        }
        Url::parse(&self.translation.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("translation.endpoint is not a valid URL ({}): {}", e, self.translation.endpoint))
        })?;
        if !(self.document.font_size_pt > 0.0) {
            return Err(ConfigError::Invalid("document.font_size_pt must be positive".to_string()));
        }
        if self.document.font_name.trim().is_empty() || self.document.east_asia_font.trim().is_empty() {
            return Err(ConfigError::Invalid("document fonts cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            translation: TranslationConfig::default(),
            chunking: ChunkingConfig {
                max_words: GENERATED_MAX_WORDS,
            },
            document: DocumentConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
