// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::Path;
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, GenerationProvider};
use app_controller::Controller;

mod app_config;
mod markup;
mod prompts;
mod generation;
mod file_utils;
mod app_controller;
mod providers;
mod errors;

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenerationProvider {
    Ollama,
    // clap would derive "open-ai" from the variant name
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
}

impl From<CliGenerationProvider> for GenerationProvider {
    fn from(cli_provider: CliGenerationProvider) -> Self {
        match cli_provider {
            CliGenerationProvider::Ollama => GenerationProvider::Ollama,
            CliGenerationProvider::OpenAI => GenerationProvider::OpenAI,
            CliGenerationProvider::Anthropic => GenerationProvider::Anthropic,
        }
    }
}

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
    /// Generate a web page from an article (default command)
    Generate(GenerateArgs),

    /// Generate shell completions for webwright
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Article text file to process (overrides config)
    #[arg(value_name = "ARTICLE_FILE")]
    article_file: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Generation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for markup generation
    #[arg(short, long)]
    model: Option<String>,

    /// Output directory for the page and images
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Skip image generation, leaving placeholders untouched
    #[arg(long)]
    no_images: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// webwright - AI article-to-web-page generator
///
/// Turns a plain-text article into a finished HTML page: the article is
/// converted to markup by an AI provider, image placeholders are filled with
/// generated illustrations, and the result is merged into a page template.
#[derive(Parser, Debug)]
#[command(name = "webwright")]
#[command(author = "webwright contributors")]
#[command(version = "0.3.0")]
#[command(about = "AI-powered article page generator")]
#[command(long_about = "webwright reads an article text file, asks an AI provider for HTML markup, \
generates an image for every placeholder the model leaves behind and merges everything into a page template.

EXAMPLES:
    webwright article.txt                      # Generate using default config
    webwright -f article.txt                   # Force overwrite existing output
    webwright -p openai -m gpt-4o article.txt  # Use specific provider and model
    webwright --no-images article.txt          # Markup only, skip image generation
    webwright -o site/ article.txt             # Write the page under site/
    webwright completions bash > webwright.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key; also used for images)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Article text file to process (overrides config)
    #[arg(value_name = "ARTICLE_FILE")]
    article_file: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Generation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for markup generation
    #[arg(short, long)]
    model: Option<String>,

    /// Output directory for the page and images
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Skip image generation, leaving placeholders untouched
    #[arg(long)]
    no_images: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };
            let emoji = Self::get_emoji_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color, now, emoji, record.args()
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

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "webwright", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => {
            // Default behavior - use top-level args
            let generate_args = GenerateArgs {
                article_file: cli.article_file,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                output_dir: cli.output_dir,
                no_images: cli.no_images,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_generate(generate_args).await
        }
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter_for(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Override config with CLI options if provided
        apply_cli_overrides(&mut config, &options);

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        // The freshly created defaults honor the same CLI overrides as a
        // loaded config, including the model choice
        apply_cli_overrides(&mut config, &options);

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(level_filter_for(&config.log_level));
    }

    if config.article_file.is_empty() {
        return Err(anyhow!("ARTICLE_FILE is required on the command line or in the config"));
    }

    // Create controller and run the pipeline
    let controller = Controller::with_config(config)?;
    controller.run(options.force_overwrite).await
}

/// Apply command line overrides on top of a loaded or default config
fn apply_cli_overrides(config: &mut Config, options: &GenerateArgs) {
    if let Some(article_file) = &options.article_file {
        config.article_file = article_file.clone();
    }

    if let Some(provider) = &options.provider {
        config.generation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        // Find the provider config and update the model
        let provider_str = config.generation.provider.to_lowercase_string();
        if let Some(provider_config) = config.generation.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.model = model.clone();
        }
    }

    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    if options.no_images {
        config.images.enabled = false;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

/// Map a config log level onto the log crate's filter
fn level_filter_for(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
