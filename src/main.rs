// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use patent_translator::app_config::{self, Config};
use patent_translator::app_controller::{Controller, PipelineRun};
use patent_translator::translation::Chunk;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a .docx file, or every .docx in a directory
    Translate(TranslateArgs),

    /// Extract and chunk a document without calling the translation service
    Plan(PlanArgs),

    /// List the models that can be selected
    Models(ConfigArgs),

    /// Check that the translation service accepts the configured API key
    Check(CheckArgs),

    /// Generate shell completions for patent-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that reads the configuration
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output file (single file mode only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model identifier from the registry
    #[arg(short, long)]
    model: Option<String>,

    /// Word budget per translation chunk
    #[arg(long)]
    max_words: Option<usize>,

    /// Write a JSON report of every chunk and its translation
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// API key for the translation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// API key for the translation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Input .docx file
    #[arg(value_name = "INPUT_FILE")]
    input_path: PathBuf,

    /// Word budget per translation chunk
    #[arg(long)]
    max_words: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Patent Translator - Korean to Japanese patent translation with AI
///
/// Translates Korean patent specifications in .docx format into Japanese,
/// including the text found in embedded drawings.
#[derive(Parser, Debug)]
#[command(name = "patent-translator")]
#[command(version)]
#[command(about = "AI-powered Korean to Japanese patent translation tool")]
#[command(long_about = "patent-translator reads a Korean patent specification (.docx), translates it into
Japanese with the Gemini API and writes a new .docx with 【NNNN】 paragraph numbering.

EXAMPLES:
    patent-translator translate spec.docx                    # Translate using default config
    patent-translator translate -m gemini-2.5-pro spec.docx  # Use a specific model
    patent-translator translate -o out.docx -f spec.docx     # Explicit output, overwrite
    patent-translator translate --report chunks.json spec.docx
    patent-translator translate /patents/                    # Process an entire directory
    patent-translator plan --max-words 200 spec.docx         # Show the chunk plan only
    patent-translator models                                 # List selectable models
    patent-translator check                                  # Verify API key and endpoint
    patent-translator completions bash > patent-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key can also be given with --api-key
    or the GEMINI_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The global max level is adjusted after the config is loaded
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "patent-translator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Plan(args) => run_plan(args),
        Commands::Models(args) => run_models(args),
        Commands::Check(args) => run_check(args).await,
    }
}

/// Load the configuration, creating a default file when none exists
fn load_config(options: &ConfigArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", options.config_path))?;
        config
    };

    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.config)?;

    if let Some(model) = &options.model {
        config.translation.select_model(model)?;
    }
    if let Some(max_words) = options.max_words {
        config.chunking.max_words = max_words;
    }
    if let Some(api_key) = &options.api_key {
        config.translation.api_key = api_key.clone();
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let result = controller
            .run(options.input_path.clone(), options.output.clone(), options.force_overwrite)
            .await?;
        if let Some(report_path) = &options.report {
            result.write_report(report_path)?;
            info!("Chunk report written to {}", report_path.display());
        }
        if let Some(output_path) = &result.output_path {
            println!("{}", output_path.display());
        }
    } else if options.input_path.is_dir() {
        if options.output.is_some() || options.report.is_some() {
            return Err(anyhow!("--output and --report are only supported for a single input file"));
        }
        let summary = controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
        if summary.errors > 0 {
            return Err(anyhow!("{} document(s) failed to translate", summary.errors));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn run_plan(options: PlanArgs) -> Result<()> {
    let mut config = load_config(&options.config)?;
    if let Some(max_words) = options.max_words {
        config.chunking.max_words = max_words;
    }
    config.validate().context("Configuration validation failed")?;

    let run = PipelineRun::from_file(&options.input_path, &config)?;
    let chunks = run.plan()?;

    println!("{:>5}  {:<6}  {:>6}  {}", "#", "kind", "words", "content");
    for (index, chunk) in chunks.iter().enumerate() {
        let preview = match chunk {
            Chunk::Text(text) => {
                let first_line = text.content.lines().next().unwrap_or_default();
                let mut preview: String = first_line.chars().take(40).collect();
                if first_line.chars().count() > 40 || text.element_count > 1 {
                    preview.push('…');
                }
                preview
            }
            Chunk::Figure(figure) => format!(
                "{} ({}x{}, {})",
                figure.figure.part_name,
                figure.figure.width,
                figure.figure.height,
                figure.figure.mime_type()
            ),
        };
        println!("{:>5}  {:<6}  {:>6}  {}", index + 1, chunk.kind(), chunk.word_count(), preview);
    }

    Ok(())
}

async fn run_check(options: CheckArgs) -> Result<()> {
    let mut config = load_config(&options.config)?;
    if let Some(api_key) = &options.api_key {
        config.translation.api_key = api_key.clone();
    }
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    controller.check_connection().await
}

fn run_models(options: ConfigArgs) -> Result<()> {
    let config = load_config(&options)?;
    config.validate().context("Configuration validation failed")?;

    for model in config.translation.models.iter() {
        let marker = if model.id == config.translation.model { "*" } else { " " };
        let recommended = if model.recommended { " (recommended)" } else { "" };
        println!("{} {:<20} {}{}", marker, model.id, model.name, recommended);
        if !model.description.is_empty() {
            println!("    {}", model.description);
        }
    }

    Ok(())
}
