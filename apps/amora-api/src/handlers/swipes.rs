use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;

use amora_db::models::matching::{Match, SwipeDirection};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::match_service::SwipeOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    #[serde(alias = "targetId")]
    pub target_id: i64,
    pub direction: String,
}

pub async fn swipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SwipeRequest>,
) -> Result<Json<SwipeOutcome>, ApiError> {
    let direction = SwipeDirection::parse(&payload.direction)
        .ok_or_else(|| ApiError::Validation("direction must be 'like' or 'pass'".into()))?;
    let outcome = state.matches.swipe(user.0, payload.target_id, direction).await?;
    Ok(Json(outcome))
}

pub async fn list_matches(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Match>>, ApiError> {
    Ok(Json(state.matches.matches_for(user.0).await?))
}
