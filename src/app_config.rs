use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path to the article text file
    #[serde(default = "default_article_file")]
    pub article_file: String,

    /// Optional path to a prompt template file with an {article} placeholder
    #[serde(default)]
    pub prompt_template_file: Option<String>,

    /// Optional path to an HTML page template file
    #[serde(default)]
    pub page_template_file: Option<String>,

    /// Element id of the container the generated fragment is merged into
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Output directory for the generated page and images
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Markup generation config
    pub generation: GenerationConfig,

    /// Image generation config
    #[serde(default)]
    pub images: ImageConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Markup generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

// Implement Display trait for GenerationProvider
impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for GenerationProvider
impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        match provider_type {
            GenerationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                max_tokens: default_max_tokens(),
                timeout_secs: default_timeout_secs(),
            },
            GenerationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                max_tokens: default_max_tokens(),
                timeout_secs: default_timeout_secs(),
            },
            GenerationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                max_tokens: default_max_tokens(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Markup generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Generation provider to use
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available generation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common generation settings
    #[serde(default)]
    pub common: GenerationCommonConfig,
}

impl GenerationConfig {
    /// Get the provider config for the active provider, if present
    pub fn active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model name for the active provider
    pub fn get_model(&self) -> String {
        self.active_provider_config()
            .map(|p| p.model.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.active_provider_config()
            .map(|p| p.endpoint.clone())
            .unwrap_or_default()
    }

    /// Get the API key for the active provider, falling back to the
    /// provider's conventional environment variable
    pub fn get_api_key(&self) -> String {
        let configured = self
            .active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default();
        if !configured.is_empty() {
            return configured;
        }
        match self.provider {
            GenerationProvider::OpenAI => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            GenerationProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            GenerationProvider::Ollama => String::new(),
        }
    }

    /// Get the max tokens setting for the active provider
    pub fn get_max_tokens(&self) -> u32 {
        self.active_provider_config()
            .map(|p| p.max_tokens)
            .unwrap_or_else(default_max_tokens)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(GenerationProvider::Ollama),
                ProviderConfig::new(GenerationProvider::OpenAI),
                ProviderConfig::new(GenerationProvider::Anthropic),
            ],
            common: GenerationCommonConfig::default(),
        }
    }
}

/// Common generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationCommonConfig {
    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
        }
    }
}

/// Image generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// Whether to generate images for placeholders at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Image model name (e.g., "dall-e-3")
    #[serde(default = "default_image_model")]
    pub model: String,

    /// API key for the image service (falls back to the OpenAI provider key)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Requested image size (e.g., "1024x1024")
    #[serde(default = "default_image_size")]
    pub size: String,

    /// Subdirectory of the output directory that holds downloaded images
    #[serde(default = "default_image_subdir")]
    pub subdir: String,

    /// Request timeout in seconds
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_image_model(),
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            size: default_image_size(),
            subdir: default_image_subdir(),
            timeout_secs: default_image_timeout_secs(),
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

fn default_article_file() -> String {
    "article.txt".to_string()
}

fn default_container_id() -> String {
    "content".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

fn default_image_timeout_secs() -> u64 {
    180
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_subdir() -> String {
    "images".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            article_file: default_article_file(),
            prompt_template_file: None,
            page_template_file: None,
            container_id: default_container_id(),
            output_dir: default_output_dir(),
            generation: GenerationConfig::default(),
            images: ImageConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration before running the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.article_file.trim().is_empty() {
            return Err(anyhow!("Article file path must not be empty"));
        }

        if self.container_id.trim().is_empty() {
            return Err(anyhow!("Container id must not be empty"));
        }

        if self.output_dir.trim().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        let provider_str = self.generation.provider.to_lowercase_string();
        let provider_config = self
            .generation
            .active_provider_config()
            .ok_or_else(|| anyhow!("No configuration found for provider: {}", provider_str))?;

        if provider_config.model.trim().is_empty() {
            return Err(anyhow!("Model must not be empty for provider: {}", provider_str));
        }

        // OpenAI and Anthropic need an API key from config or environment
        match self.generation.provider {
            GenerationProvider::OpenAI => {
                if provider_config.api_key.is_empty()
                    && std::env::var("OPENAI_API_KEY").is_err()
                {
                    return Err(anyhow!(
                        "OpenAI API key missing: set it in the config or the OPENAI_API_KEY environment variable"
                    ));
                }
            }
            GenerationProvider::Anthropic => {
                if provider_config.api_key.is_empty()
                    && std::env::var("ANTHROPIC_API_KEY").is_err()
                {
                    return Err(anyhow!(
                        "Anthropic API key missing: set it in the config or the ANTHROPIC_API_KEY environment variable"
                    ));
                }
            }
            GenerationProvider::Ollama => {}
        }

        if self.images.enabled
            && self.images.api_key.is_empty()
            && std::env::var("OPENAI_API_KEY").is_err()
            && !self
                .generation
                .available_providers
                .iter()
                .any(|p| p.provider_type == "openai" && !p.api_key.is_empty())
        {
            return Err(anyhow!(
                "Image generation is enabled but no OpenAI API key is available; disable images or provide a key"
            ));
        }

        let common = &self.generation.common;
        if !(0.0..=1.0).contains(&common.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 1.0, got {}",
                common.temperature
            ));
        }

        Ok(())
    }

    /// Resolve the API key for the image service.
    ///
    /// Order: explicit image key, OpenAI provider key, OPENAI_API_KEY env var.
    pub fn image_api_key(&self) -> String {
        if !self.images.api_key.is_empty() {
            return self.images.api_key.clone();
        }
        if let Some(openai) = self
            .generation
            .available_providers
            .iter()
            .find(|p| p.provider_type == "openai" && !p.api_key.is_empty())
        {
            return openai.api_key.clone();
        }
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shouldPassValidation() {
        let mut config = Config::default();
        // Defaults use Ollama for text; turn images off so no key is needed
        config.images.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_withEmptyArticlePath_returnsError() {
        let mut config = Config::default();
        config.article_file = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_withUnknownActiveProvider_returnsError() {
        let mut config = Config::default();
        config.images.enabled = false;
        config.generation.available_providers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_withBadTemperature_returnsError() {
        let mut config = Config::default();
        config.images.enabled = false;
        config.generation.common.temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_providerFromStr_parsesKnownNames() {
        use std::str::FromStr;
        assert_eq!(GenerationProvider::from_str("OpenAI").unwrap(), GenerationProvider::OpenAI);
        assert_eq!(GenerationProvider::from_str("ollama").unwrap(), GenerationProvider::Ollama);
        assert!(GenerationProvider::from_str("dalle").is_err());
    }

    #[test]
    fn test_configRoundTrip_throughJson() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.generation.provider, config.generation.provider);
        assert_eq!(parsed.output_dir, config.output_dir);
        assert_eq!(parsed.images.model, config.images.model);
    }

    #[test]
    fn test_imageApiKey_prefersExplicitKey() {
        let mut config = Config::default();
        config.images.api_key = "img-key".to_string();
        if let Some(openai) = config
            .generation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == "openai")
        {
            openai.api_key = "text-key".to_string();
        }
        assert_eq!(config.image_api_key(), "img-key");
    }
}
