//! Completion proxy handler.
//!
//! POST /api/completions - forward a conversation to the completion service
//! with the configured system instruction prepended.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use chatkeep_types::chat::ChatMessage;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::http::response::CompletionReply;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompletionBody {
    pub messages: Vec<ChatMessage>,
}

/// POST /api/completions
pub async fn create_completion(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CompletionBody>,
) -> Result<Json<CompletionReply>, AppError> {
    let response = state.completion.complete(body.messages).await?;
    Ok(Json(CompletionReply::from_response(
        response,
        chrono::Utc::now().timestamp(),
    )))
}
