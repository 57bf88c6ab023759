//! Application error type mapping to HTTP status codes and `{error}` bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatkeep_infra::secret::ApiKeyError;
use chatkeep_types::error::{GatewayError, ValidationError};
use chatkeep_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversation gateway errors.
    Gateway(GatewayError),
    /// Completion errors.
    Llm(LlmError),
    /// API key administration errors.
    ApiKey(ApiKeyError),
    /// Missing or wrong admin token.
    Unauthorized(String),
    /// Malformed request body.
    Validation(String),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        AppError::Gateway(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl From<ApiKeyError> for AppError {
    fn from(e: ApiKeyError) -> Self {
        AppError::ApiKey(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Gateway(GatewayError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Gateway(GatewayError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Gateway(GatewayError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Llm(LlmError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ApiKey(ApiKeyError::Invalid) => StatusCode::BAD_REQUEST,
            AppError::ApiKey(ApiKeyError::Persist(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Gateway(GatewayError::Storage(_)) => {
                "failed to persist conversation changes".to_string()
            }
            AppError::Gateway(e) => e.to_string(),
            AppError::Llm(e) => e.to_string(),
            AppError::ApiKey(ApiKeyError::Persist(_)) => "failed to save API key".to_string(),
            AppError::ApiKey(e) => e.to_string(),
            AppError::Unauthorized(msg) | AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatkeep_types::error::StoreError;

    #[test]
    fn maps_gateway_errors() {
        let err = AppError::from(GatewayError::NotFound("c1".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(GatewayError::Validation(ValidationError::new("messages is required")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "messages is required");

        let err = AppError::from(GatewayError::Storage(StoreError::Write {
            id: "c1".to_string(),
            message: "disk full".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("disk full"));
    }

    #[test]
    fn remote_message_is_surfaced() {
        let err = AppError::from(LlmError::Provider {
            message: "You exceeded your current quota".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "You exceeded your current quota");
    }

    #[test]
    fn missing_key_is_server_error() {
        let err = AppError::from(LlmError::MissingApiKey);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
