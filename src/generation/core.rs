/*!
 * Core markup generation service.
 *
 * This module contains the MarkupGenerator struct, which turns a rendered
 * article prompt into an HTML fragment using the configured AI provider.
 */

use anyhow::{Result, anyhow};
use log::debug;

use crate::app_config::{GenerationConfig, GenerationProvider as ConfigGenerationProvider};
use crate::markup::MarkupDocument;
use crate::providers::ollama::{Ollama, GenerationRequest};
use crate::providers::openai::{OpenAI, ChatCompletionRequest};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};

/// Markup provider implementation variants
enum MarkupProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Main service for generating the markup document from an article prompt
pub struct MarkupGenerator {
    /// Provider implementation
    provider: MarkupProviderImpl,

    /// Configuration for the generation service
    pub config: GenerationConfig,
}

impl MarkupGenerator {
    /// Create a new markup generator with the given configuration
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let provider = match config.provider {
            ConfigGenerationProvider::Ollama => MarkupProviderImpl::Ollama {
                client: Ollama::from_url(config.get_endpoint()),
            },
            ConfigGenerationProvider::OpenAI => MarkupProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint()),
            },
            ConfigGenerationProvider::Anthropic => MarkupProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint()),
            },
        };

        Ok(Self { provider, config })
    }

    /// Generate the markup document for a rendered prompt.
    ///
    /// Issues exactly one request; a failure here aborts the whole run since
    /// nothing downstream can proceed without the markup.
    pub async fn generate(&self, prompt: &str) -> Result<MarkupDocument> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;
        debug!("Requesting markup from {} ({})", self.config.provider.display_name(), model);

        let raw = match &self.provider {
            MarkupProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(&model, prompt)
                    .temperature(temperature)
                    .num_predict(self.config.get_max_tokens());
                let response = client.generate(request).await?;
                response.response
            }
            MarkupProviderImpl::OpenAI { client } => {
                let request = ChatCompletionRequest::new(&model)
                    .add_message("user", prompt)
                    .temperature(temperature)
                    .max_tokens(self.config.get_max_tokens());
                let response = client.complete(request).await?;
                OpenAI::extract_text_from_response(&response)
            }
            MarkupProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(&model, self.config.get_max_tokens())
                    .add_message("user", prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Anthropic::extract_text_from_response(&response)
            }
        };

        let document = MarkupDocument::from_generated(&raw);
        if document.is_empty() {
            return Err(anyhow!(
                "{} returned an empty markup document",
                self.config.provider.display_name()
            ));
        }

        Ok(document)
    }

    /// Test the connection to the configured provider
    pub async fn test_connection(&self) -> Result<()> {
        let model = self.config.get_model();
        match &self.provider {
            MarkupProviderImpl::Ollama { client } => {
                client.version().await?;
                Ok(())
            }
            MarkupProviderImpl::OpenAI { client } => client.test_connection(&model).await,
            MarkupProviderImpl::Anthropic { client } => client.test_connection(&model).await,
        }
    }
}
