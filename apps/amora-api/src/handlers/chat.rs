use axum::Json;
use axum::extract::{Extension, Path, State};
use serde::Deserialize;

use amora_db::models::message::{ChatMessage, ConversationSummary};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    Ok(Json(state.chat.conversations(user.0).await?))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(match_id): Path<i64>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    Ok(Json(state.chat.messages(user.0, match_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(match_id): Path<i64>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = state.chat.send_message(user.0, match_id, &payload.body).await?;
    Ok(Json(message))
}
