use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mep_core::MepError;
use mep_llm::LlmError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },

    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_with(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    /// The local LLM could not serve the request.
    pub fn llm_offline(endpoint: &str, cause: &LlmError) -> Self {
        tracing::error!(error = %cause, endpoint, "LLM request failed");
        ApiError::ServiceUnavailable {
            message: "Local LLM offline or unreachable".to_string(),
            details: Some(format!("Ensure Ollama is running at {endpoint}")),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<MepError> for ApiError {
    fn from(err: MepError) -> Self {
        match err {
            MepError::InvalidInput(msg) => ApiError::BadRequest(msg),
            MepError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::internal_with("Internal server error", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Internal { details, .. } | ApiError::ServiceUnavailable { details, .. } => {
                details.clone()
            }
            _ => None,
        };

        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
