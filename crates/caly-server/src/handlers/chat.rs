use std::time::Duration;

use actix_web::{web, HttpResponse};
use caly_core::{build_prompt, normalize_reply, ChatContext};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::logging::{preview, Timer};
use crate::state::AppState;

const SLOW_GENERATION: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

pub async fn handler(
    state: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    let ChatRequest { message, context } = req.into_inner();

    let message = message
        .filter(|message| !message.is_empty())
        .ok_or(AppError::EmptyMessage)?;
    let provider = state.backend.provider().ok_or(AppError::NotConfigured)?;
    let context = context.unwrap_or_default();

    let now = chrono::Local::now().naive_local();
    let prompt = build_prompt(&message, &context, now);

    log::debug!(
        "Chat request: {:?} (events: {}, history: {})",
        message,
        context.events.len(),
        context.chat_history.len()
    );

    let raw = {
        let _timer = Timer::new(format!("{} generate", provider.model()), SLOW_GENERATION);
        provider
            .generate(&prompt, &state.generation)
            .await
            .map_err(|e| {
                log::error!("Model call failed: {}", e);
                AppError::Upstream(e)
            })?
    };

    log::debug!("[AI] Response: {}", preview(&raw, 200));

    Ok(HttpResponse::Ok().json(normalize_reply(&raw)))
}
