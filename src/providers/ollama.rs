use anyhow::{Result, anyhow, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::error;

/// Ollama client for interacting with Ollama API
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    pub created_at: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Builder methods for GenerationRequest - API surface for library consumers
#[allow(dead_code)]
impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        if let Some(options) = &mut self.options {
            options.temperature = Some(temperature);
        } else {
            self.options = Some(GenerationOptions {
                temperature: Some(temperature),
                num_predict: None,
            });
        }
        self
    }

    /// Set the maximum number of tokens to generate
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        if let Some(options) = &mut self.options {
            options.num_predict = Some(num_predict);
        } else {
            self.options = Some(GenerationOptions {
                temperature: None,
                num_predict: Some(num_predict),
            });
        }
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            base_url: url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to Ollama API: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(anyhow!("Ollama API error ({}): {}", status, error_text));
        }

        let response_text = response.text().await
            .map_err(|e| anyhow!("Failed to get response text from Ollama API: {}", e))?;

        // Non-streaming requests come back as a single JSON object; a stray
        // streaming response arrives as JSONL, so fall back to the last line
        match serde_json::from_str::<GenerationResponse>(&response_text) {
            Ok(generated_response) => Ok(generated_response),
            Err(e) => {
                error!("Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                      e, if response_text.chars().count() > 500 {
                          response_text.chars().take(500).collect::<String>()
                      } else {
                          response_text.clone()
                      });

                let mut full_response = String::new();
                let mut done = false;
                let mut model = "unknown".to_string();
                let mut created_at = String::new();

                for line in response_text.lines().filter(|l| !l.is_empty()) {
                    let value: serde_json::Value = serde_json::from_str(line)
                        .map_err(|_| anyhow!("Failed to parse Ollama API response: {}. Response contains invalid JSON.", e))?;

                    if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
                        full_response.push_str(part);
                    }
                    if value.get("done").and_then(|v| v.as_bool()).unwrap_or(false) {
                        done = true;
                    }
                    if let Some(m) = value.get("model").and_then(|v| v.as_str()) {
                        model = m.to_string();
                    }
                    if let Some(c) = value.get("created_at").and_then(|v| v.as_str()) {
                        created_at = c.to_string();
                    }
                }

                if full_response.is_empty() && !done {
                    return Err(anyhow!("Failed to parse Ollama API response: {}", e));
                }

                Ok(GenerationResponse {
                    model,
                    created_at,
                    response: full_response,
                    done: true,
                    prompt_eval_count: None,
                    eval_count: None,
                })
            }
        }
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String> {
        let url = format!("{}/api/version", self.base_url.trim_end_matches('/'));
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .context("Failed to connect to Ollama")?
            .json()
            .await
            .context("Failed to parse Ollama version response")?;

        let version = response["version"].as_str()
            .ok_or_else(|| anyhow!("Invalid version format in response"))?
            .to_string();

        Ok(version)
    }
}
