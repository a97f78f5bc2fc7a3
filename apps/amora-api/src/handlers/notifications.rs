use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::json;

use amora_db::models::notification::Notification;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifications.list(user.0).await?))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    /// Specific notification ids, or absent to mark everything read.
    pub ids: Option<Vec<i64>>,
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.notifications.mark_read(user.0, payload.ids).await?;
    Ok(Json(json!({ "updated": updated })))
}
