use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use caly_llm::providers::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use caly_llm::{GeminiProvider, GenerationParams, HttpClientConfig, LLMProvider};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "calyai-server")]
#[command(about = "CalyAI scheduling assistant server")]
#[command(version)]
pub struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Directory served for the frontend bundle
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// Gemini API key; chat is disabled without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    /// Per-attempt timeout for model calls, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    /// Retries for transient model call failures
    #[arg(long, env = "MAX_RETRIES", default_value = "2")]
    pub max_retries: u32,

    /// Shortest wait between retries, in milliseconds
    #[arg(long, env = "RETRY_MIN_BACKOFF_MS", default_value = "500")]
    pub retry_min_backoff_ms: u64,

    /// Longest wait between retries, in milliseconds
    #[arg(long, env = "RETRY_MAX_BACKOFF_MS", default_value = "8000")]
    pub retry_max_backoff_ms: u64,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}

/// Connection settings for the Gemini API.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub gemini: GeminiSettings,
    pub http: HttpClientConfig,
    pub generation: GenerationParams,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("."),
            gemini: GeminiSettings {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            http: HttpClientConfig::default(),
            generation: GenerationParams::default(),
        }
    }
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        let defaults = ServerConfig::default();
        Self {
            host: cli.host,
            port: cli.port,
            static_dir: cli.static_dir,
            gemini: GeminiSettings {
                api_key: cli
                    .gemini_api_key
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty()),
                model: cli.gemini_model,
                base_url: cli.gemini_base_url,
            },
            http: defaults
                .http
                .with_timeout(Duration::from_secs(cli.request_timeout_secs))
                .with_max_retries(cli.max_retries)
                .with_backoff(
                    Duration::from_millis(cli.retry_min_backoff_ms),
                    Duration::from_millis(cli.retry_max_backoff_ms),
                ),
            generation: defaults.generation,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn llm_backend(&self) -> caly_llm::Result<LlmBackend> {
        let Some(api_key) = self.gemini.api_key.as_deref() else {
            return Ok(LlmBackend::Unconfigured);
        };

        let provider = GeminiProvider::with_http_config(api_key, &self.http)?
            .with_base_url(self.gemini.base_url.clone())
            .with_model(self.gemini.model.clone());

        Ok(LlmBackend::Configured(Arc::new(provider)))
    }
}

/// The model collaborator, or its explicit absence when no API key is set.
#[derive(Clone)]
pub enum LlmBackend {
    Configured(Arc<dyn LLMProvider>),
    Unconfigured,
}

impl LlmBackend {
    pub fn is_configured(&self) -> bool {
        matches!(self, LlmBackend::Configured(_))
    }

    pub fn provider(&self) -> Option<&Arc<dyn LLMProvider>> {
        match self {
            LlmBackend::Configured(provider) => Some(provider),
            LlmBackend::Unconfigured => None,
        }
    }
}

impl std::fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmBackend::Configured(provider) => {
                f.debug_tuple("Configured").field(&provider.model()).finish()
            }
            LlmBackend::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}
