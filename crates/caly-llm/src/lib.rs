pub mod client;
pub mod provider;
pub mod providers;

pub use client::{build_http_client, HttpClientConfig};
pub use provider::{GenerationParams, LLMError, LLMProvider, Result};
pub use providers::GeminiProvider;
