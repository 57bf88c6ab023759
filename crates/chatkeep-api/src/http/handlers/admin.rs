//! API key administration handlers.
//!
//! Endpoints:
//! - GET  /api/admin/apikey - Whether a completion API key is configured
//! - POST /api/admin/apikey - Set the completion API key
//!
//! The key itself is never returned.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use chatkeep_infra::secret::ApiKeyError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::json::ApiJson;
use crate::http::response::Ack;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub has_key: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetApiKeyBody {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// GET /api/admin/apikey
pub async fn get_api_key_status(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Json<ApiKeyStatus> {
    Json(ApiKeyStatus {
        has_key: state.api_keys.has_key().await,
    })
}

/// POST /api/admin/apikey
pub async fn set_api_key(
    State(state): State<AppState>,
    _auth: Authenticated,
    ApiJson(body): ApiJson<SetApiKeyBody>,
) -> Result<Json<Ack>, AppError> {
    let key = body.api_key.ok_or(ApiKeyError::Invalid)?;
    state.api_keys.set(&key).await?;
    Ok(Json(Ack::ok()))
}
