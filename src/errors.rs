use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Upstream responded with {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service not ready: {0}")]
    NotReady(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::HttpRequest(_) | AppError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            AppError::JsonSerialization(_)
            | AppError::InvalidConfig(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = match self {
            AppError::NotFound(msg)
            | AppError::Internal(msg)
            | AppError::NotReady(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        let status_code = self.status_code();
        HttpResponse::build(status_code).json(json!({
            "error": error_message,
            "code": status_code.as_u16()
        }))
    }
}

pub type AppResult<T> = Result<T, AppError>;
