use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use caly_core::ChatReply;
use caly_llm::LLMError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No message provided")]
    EmptyMessage,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    InvalidSlotRequest(String),

    #[error("Gemini API not configured")]
    NotConfigured,

    #[error("{0}")]
    Upstream(#[from] LLMError),
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

/// Server failures still carry a renderable chat reply.
#[derive(Serialize)]
struct ChatErrorReply {
    error: String,
    #[serde(flatten)]
    reply: ChatReply,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSlotRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error = self.to_string();

        if status_code.is_client_error() {
            return HttpResponse::build(status_code).json(JsonError { error });
        }

        let reply = ChatReply::fallback(format!("Sorry, I encountered an error: {}", error));
        HttpResponse::build(status_code).json(ChatErrorReply { error, reply })
    }
}
