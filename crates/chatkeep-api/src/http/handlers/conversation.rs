//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/conversations      - List conversations, newest first (admin)
//! - GET    /api/conversations/{id} - Get one conversation (admin)
//! - POST   /api/conversations      - Save (create or replace) a conversation
//! - DELETE /api/conversations/{id} - Delete a conversation (admin)

use axum::Json;
use axum::extract::{Path, State};

use chatkeep_types::chat::{ConversationPayload, ConversationRecord};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::json::ApiJson;
use crate::http::response::Ack;
use crate::state::AppState;

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Json<Vec<ConversationRecord>> {
    let conversations = state.chat_gateway.list_conversations().await;
    tracing::debug!(count = conversations.len(), "listing conversations");
    Json(conversations)
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ConversationRecord>, AppError> {
    Ok(Json(state.chat_gateway.get_conversation(&id).await?))
}

/// POST /api/conversations
///
/// Open to the chat UI, which saves after every exchange.
pub async fn save_conversation(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ConversationPayload>,
) -> Result<Json<Ack>, AppError> {
    state.chat_gateway.save_conversation(payload).await?;
    Ok(Json(Ack::ok()))
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Ack>, AppError> {
    state.chat_gateway.delete_conversation(&id).await?;
    Ok(Json(Ack::ok()))
}
