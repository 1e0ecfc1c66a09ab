use std::time::Duration;
use serde::{Serialize, Deserialize};
use anyhow::{Result, anyhow};
use bytes::Bytes;
use reqwest::Client;
use url::Url;
use log::error;

/// OpenAI client for chat completions and image generation
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    pub choices: Vec<ChatChoice>,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Individual completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u32,
    /// Number of completion tokens
    pub completion_tokens: u32,
    /// Total tokens consumed
    pub total_tokens: u32,
}

/// Image generation request for the /images/generations endpoint
#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    /// Image model name
    model: String,

    /// Description of the desired image
    prompt: String,

    /// Number of images to generate
    n: u32,

    /// Requested image size, e.g. "1024x1024"
    size: String,

    /// Response format; "url" so the pipeline can download the bytes itself
    response_format: String,
}

/// Image generation response
#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    /// Generated image entries
    pub data: Vec<ImageData>,
}

/// A single generated image
#[derive(Debug, Deserialize)]
pub struct ImageData {
    /// URL of the generated image
    pub url: Option<String>,

    /// The prompt as revised by the image model, if any
    pub revised_prompt: Option<String>,
}

impl ChatCompletionRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl ImageGenerationRequest {
    /// Create a new image generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            size: size.into(),
            response_format: "url".to_string(),
        }
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(180))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Base API URL, falling back to the public endpoint
    fn api_base(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Complete a chat completion request
    pub async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let api_url = format!("{}/chat/completions", self.api_base());

        let response = self.client.post(&api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to OpenAI API: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let completion = response.json::<ChatCompletionResponse>().await
            .map_err(|e| anyhow!("Failed to parse OpenAI API response: {}", e))?;

        Ok(completion)
    }

    /// Generate a single image and return its metadata (URL, revised prompt)
    pub async fn generate_image(&self, request: ImageGenerationRequest) -> Result<ImageData> {
        let api_url = format!("{}/images/generations", self.api_base());

        let response = self.client.post(&api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to OpenAI images API: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI images API error ({}): {}", status, error_text);
            return Err(anyhow!("OpenAI images API error ({}): {}", status, error_text));
        }

        let mut image_response = response.json::<ImageGenerationResponse>().await
            .map_err(|e| anyhow!("Failed to parse OpenAI images API response: {}", e))?;

        if image_response.data.is_empty() {
            return Err(anyhow!("OpenAI images API returned no image data"));
        }

        Ok(image_response.data.remove(0))
    }

    /// Download the bytes behind a generated image URL
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        // The API hands back absolute URLs; reject anything else up front
        let parsed = Url::parse(url)
            .map_err(|e| anyhow!("Invalid image URL {}: {}", url, e))?;

        let response = self.client.get(parsed)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to download image from {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            error!("Image download failed ({}) for {}", status, url);
            return Err(anyhow!("Image download failed ({}) for {}", status, url));
        }

        response.bytes().await
            .map_err(|e| anyhow!("Failed to read image bytes from {}: {}", url, e))
    }

    /// Test the connection to the OpenAI API
    pub async fn test_connection(&self, model: &str) -> Result<()> {
        let request = ChatCompletionRequest::new(model)
            .add_message("user", "Hello")
            .max_tokens(10);

        self.complete(request).await?;
        Ok(())
    }

    /// Extract text from a chat completion response
    pub fn extract_text_from_response(response: &ChatCompletionResponse) -> String {
        response.choices.iter()
            .map(|c| c.message.content.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractTextFromResponse_concatenatesChoices() {
        let response = ChatCompletionResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: "<p>Hi</p>".to_string(),
                },
            }],
            usage: None,
        };
        assert_eq!(OpenAI::extract_text_from_response(&response), "<p>Hi</p>");
    }

    #[test]
    fn test_imageRequest_serializesUrlFormat() {
        let request = ImageGenerationRequest::new("dall-e-3", "a red kite", "1024x1024");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"], "url");
        assert_eq!(json["n"], 1);
        assert_eq!(json["prompt"], "a red kite");
    }

    #[tokio::test]
    async fn test_download_withInvalidUrl_returnsError() {
        let client = OpenAI::new("key", "");
        let result = client.download("not a url").await;
        assert!(result.is_err());
    }
}
