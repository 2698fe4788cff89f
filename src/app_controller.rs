use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::app_config::{Config, FigureDecodePolicy, ModelId};
use crate::document::writer::to_docx_bytes;
use crate::document::{ContentExtractor, DocumentStyle, OutputDocument, new_output_document};
use crate::errors::{AppError, ConfigError};
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::translation::{
    Chunk, ImageTranslationPair, RetryPolicy, TokenUsageStats, TranslationService, chunk_elements,
};

// @module: Application controller for document translation

/// Immutable context of one pipeline run
///
/// Everything a run depends on is captured here when the run is prepared,
/// so later configuration changes never leak into a run in progress.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    // @field: Unique id used in logs
    pub run_id: Uuid,
    pub source_path: PathBuf,
    pub source_bytes: Vec<u8>,
    pub model: ModelId,
    pub max_words: usize,
    pub decode_policy: FigureDecodePolicy,
    pub style: DocumentStyle,
    pub started_at: DateTime<Local>,
}

impl PipelineRun {
    /// Capture a run context from a configuration snapshot
    pub fn new(source_path: PathBuf, source_bytes: Vec<u8>, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            run_id: Uuid::new_v4(),
            source_path,
            source_bytes,
            model: config.translation.active_model()?,
            max_words: config.chunking.max_words,
            decode_policy: config.document.figure_decode_policy,
            style: DocumentStyle::from(&config.document),
            started_at: Local::now(),
        })
    }

    /// Read a source document from disk
    pub fn from_file(input_file: &Path, config: &Config) -> Result<Self> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let bytes = FileManager::read_bytes(input_file)?;
        Ok(Self::new(input_file.to_path_buf(), bytes, config)?)
    }

    /// Extract and chunk without translating
    pub fn plan(&self) -> Result<Vec<Chunk>, AppError> {
        let elements = ContentExtractor::new(self.decode_policy).extract_bytes(&self.source_bytes)?;
        let chunks = chunk_elements(&elements, self.max_words);
        let figures = chunks.iter().filter(|c| matches!(c, Chunk::Figure(_))).count();
        info!(
            "Chunk plan for {}: {} chunks ({} text, {} figures), budget {} words",
            self.source_name(),
            chunks.len(),
            chunks.len() - figures,
            figures,
            self.max_words
        );
        Ok(chunks)
    }

    /// File name of the source document, for display
    pub fn source_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Translation attached to a chunk in the report
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportTranslation {
    Text(String),
    Figure(Vec<ImageTranslationPair>),
}

/// One row of the per-chunk report
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub kind: &'static str,
    pub word_count: usize,
    /// Source text, or the image part name for figures
    pub source: String,
    pub translated: Option<ReportTranslation>,
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunResult {
    pub run_id: Uuid,
    pub chunks: Vec<Chunk>,
    pub document: OutputDocument,
    /// Serialized output document
    pub docx: Vec<u8>,
    /// Where the document was written, when persisted
    pub output_path: Option<PathBuf>,
    pub duration: Duration,
    /// Usage recorded by the translation service so far
    pub token_usage: TokenUsageStats,
}

impl RunResult {
    /// Per-chunk table of sources and translations
    pub fn report(&self) -> Vec<ChunkReport> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| match chunk {
                Chunk::Text(text) => ChunkReport {
                    index,
                    kind: chunk.kind(),
                    word_count: text.word_count,
                    source: text.content.clone(),
                    translated: text.translated().map(|t| ReportTranslation::Text(t.to_string())),
                },
                Chunk::Figure(figure) => ChunkReport {
                    index,
                    kind: chunk.kind(),
                    word_count: 0,
                    source: figure.figure.part_name.clone(),
                    translated: figure.translated().map(|p| ReportTranslation::Figure(p.to_vec())),
                },
            })
            .collect()
    }

    /// Write the chunk report as pretty JSON
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.report()).context("Failed to serialize chunk report")?;
        FileManager::write_to_file(path, &json)
    }
}

/// Counters of a folder run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller for document translation
pub struct Controller<P: Provider = Gemini> {
    // @field: App configuration
    config: Config,
    // @field: Translation service shared by all runs of this controller
    service: TranslationService<P>,
}

impl Controller<Gemini> {
    // @method: Create a controller talking to the Gemini API
    pub fn with_config(config: Config) -> Result<Self> {
        let translation = &config.translation;
        if translation.api_key.trim().is_empty() {
            return Err(anyhow!(
                "No API key configured (set translation.api_key, --api-key or GEMINI_API_KEY)"
            ));
        }
        let provider = Gemini::new(
            translation.api_key.clone(),
            translation.endpoint.clone(),
            Duration::from_secs(translation.timeout_secs),
            translation.temperature,
        );
        Self::with_provider(config, provider)
    }
}

impl<P: Provider> Controller<P> {
    // @method: Create a controller with an explicit provider
    pub fn with_provider(config: Config, provider: P) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let retry = RetryPolicy::from(&config.translation.common);
        Ok(Self {
            config,
            service: TranslationService::new(provider, retry),
        })
    }

    /// Verify that the translation service is reachable with the configured credentials
    pub async fn check_connection(&self) -> Result<()> {
        self.service
            .provider()
            .test_connection()
            .await
            .context("Translation service connection check failed")?;
        info!("Translation service reachable, using model {}", self.config.translation.model);
        Ok(())
    }

    /// Read a source document and capture the run context
    pub fn prepare_run(&self, input_file: &Path) -> Result<PipelineRun> {
        let run = PipelineRun::from_file(input_file, &self.config)?;
        debug!("Prepared run {} for {}", run.run_id, run.source_name());
        Ok(run)
    }

    /// Translate every chunk in order and assemble the output document
    ///
    /// `progress` is called with (completed, total) after each chunk. Nothing
    /// is written to disk here.
    pub async fn execute<F>(&self, run: &PipelineRun, mut progress: F) -> Result<RunResult, AppError>
    where
        F: FnMut(usize, usize),
    {
        let start_time = Instant::now();
        let mut chunks = run.plan()?;
        if chunks.is_empty() {
            warn!("No translatable content found in {}", run.source_name());
        }

        let mut document = new_output_document(run.style.clone());
        let total = chunks.len();
        for (i, chunk) in chunks.iter_mut().enumerate() {
            match chunk {
                Chunk::Text(text) => {
                    let translated = self.service.translate_text(&text.content, &run.model).await?;
                    document.append_text_chunk(&translated);
                    text.attach_translation(translated);
                }
                Chunk::Figure(figure) => {
                    let pairs = self.service.translate_figure(&figure.figure, &run.model).await?;
                    document.append_figure_chunk(&pairs);
                    figure.attach_translation(pairs);
                }
            }
            debug!("Run {}: chunk {}/{} done", run.run_id, i + 1, total);
            progress(i + 1, total);
        }

        let docx = to_docx_bytes(&document)?;
        Ok(RunResult {
            run_id: run.run_id,
            chunks,
            document,
            docx,
            output_path: None,
            duration: start_time.elapsed(),
            token_usage: self.service.token_usage(),
        })
    }

    /// Translate one file and persist the result
    ///
    /// The output defaults to `<stem>_translated_<timestamp>.docx` next to
    /// the input. An existing output is only replaced with `force_overwrite`.
    pub async fn run(&self, input_file: PathBuf, output_file: Option<PathBuf>, force_overwrite: bool) -> Result<RunResult> {
        let run = self.prepare_run(&input_file)?;

        let output_path = match output_file {
            Some(path) => path,
            None => {
                let output_dir = match input_file.parent() {
                    Some(parent) => parent.to_path_buf(),
                    None => PathBuf::from("."),
                };
                FileManager::generate_output_path(&input_file, output_dir, run.started_at)
            }
        };
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {:?} (use -f to force overwrite)",
                output_path
            ));
        }

        info!("Translating {} with {}", run.source_name(), run.model);

        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let result = self
            .execute(&run, move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let mut result = result.with_context(|| format!("Translation of {} failed", run.source_name()))?;

        FileManager::write_bytes_atomic(&output_path, &result.docx, force_overwrite)?;
        result.output_path = Some(output_path.clone());

        info!(
            "Translation completed in {}: {} chunks -> {}",
            Self::format_duration(result.duration),
            result.chunks.len(),
            output_path.display()
        );
        info!("{}", result.token_usage.summary(&run.model));

        Ok(result)
    }

    /// Run the workflow in folder mode, translating every .docx in a directory
    /// Previous outputs of this tool are skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents = FileManager::find_files(&input_dir, "docx")?;
        if documents.is_empty() {
            return Err(anyhow!("No .docx files found in directory: {:?}", input_dir));
        }

        let mut summary = FolderSummary::default();
        for document in documents {
            if FileManager::is_translated_output(&document) {
                debug!("Skipping previous output {:?}", document);
                summary.skipped += 1;
                continue;
            }

            match self.run(document.clone(), None, force_overwrite).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {:?}: {:#}", document, e);
                    summary.errors += 1;
                }
            }
        }

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.errors
        );
        Ok(summary)
    }

    /// Human readable duration
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
