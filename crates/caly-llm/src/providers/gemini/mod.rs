//! Google Gemini provider implementation.

mod api_types;

pub use api_types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;

use crate::client::{build_http_client, HttpClientConfig};
use crate::provider::{GenerationParams, LLMError, LLMProvider, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a provider with the default transport settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_http_config(api_key, &HttpClientConfig::default())
    }

    pub fn with_http_config(api_key: impl Into<String>, config: &HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Set a custom base URL (e.g., for proxies or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name. A leading `models/` is accepted and dropped.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model
            .strip_prefix("models/")
            .map(str::to_string)
            .unwrap_or(model);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(prompt: &str, params: &GenerationParams) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = Self::build_request(prompt, params);

        log::debug!(
            "Gemini request: model={}, prompt_chars={}, temperature={}, max_output_tokens={}",
            self.model,
            prompt.chars().count(),
            params.temperature,
            params.max_output_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(LLMError::Auth(format!(
                    "Gemini authentication failed: {}. Please check your API key.",
                    text
                )));
            }

            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text()
            .ok_or_else(|| LLMError::EmptyResponse(body.empty_reason()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
