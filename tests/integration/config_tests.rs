/*!
 * Integration tests for configuration loading and validation
 */

use anyhow::Result;

use webwright::app_config::{Config, GenerationProvider};
use webwright::file_utils::FileManager;
use crate::common;

/// Test that a default config written to disk loads back and validates
#[test]
fn test_config_withWrittenDefaults_shouldLoadAndValidate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.images.enabled = false;
    let json = serde_json::to_string_pretty(&config)?;
    std::fs::write(&config_path, &json)?;

    let content = FileManager::read_to_string(&config_path)?;
    let loaded: Config = serde_json::from_str(&content)?;

    assert_eq!(loaded.generation.provider, GenerationProvider::Ollama);
    assert_eq!(loaded.output_dir, "output");
    assert_eq!(loaded.container_id, "content");
    loaded.validate()?;

    Ok(())
}

/// Test that a partial config file picks up defaults for missing fields
#[test]
fn test_config_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "article_file": "my-article.txt",
        "generation": { "provider": "ollama" }
    }"#;

    let config: Config = serde_json::from_str(json)?;
    assert_eq!(config.article_file, "my-article.txt");
    assert_eq!(config.output_dir, "output");
    assert_eq!(config.images.model, "dall-e-3");
    assert_eq!(config.images.subdir, "images");

    Ok(())
}

/// Test that validation rejects a provider with no configuration entry
#[test]
fn test_config_withMissingProviderEntry_shouldFailValidation() {
    let mut config = Config::default();
    config.images.enabled = false;
    config.generation.provider = GenerationProvider::OpenAI;
    config.generation.available_providers
        .retain(|p| p.provider_type != "openai");

    assert!(config.validate().is_err());
}

/// Test that the image API key falls back to the OpenAI provider entry
#[test]
fn test_config_imageApiKey_shouldFallBackToOpenAiProviderKey() {
    let mut config = Config::default();
    if let Some(openai) = config
        .generation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "openai")
    {
        openai.api_key = "provider-key".to_string();
    }

    assert_eq!(config.image_api_key(), "provider-key");
}
