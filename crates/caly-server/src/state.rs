use caly_llm::GenerationParams;

use crate::config::{LlmBackend, ServerConfig};

/// Request-independent state shared by all workers. Holds no scheduling data.
pub struct AppState {
    pub backend: LlmBackend,
    pub generation: GenerationParams,
}

impl AppState {
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            generation: GenerationParams::default(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> caly_llm::Result<Self> {
        let backend = config.llm_backend()?;
        match &backend {
            LlmBackend::Configured(provider) => {
                log::info!("Gemini API configured (model: {})", provider.model());
            }
            LlmBackend::Unconfigured => {
                log::warn!("GEMINI_API_KEY not set; /api/chat will return 500 until configured");
            }
        }

        Ok(Self {
            backend,
            generation: config.generation,
        })
    }
}
