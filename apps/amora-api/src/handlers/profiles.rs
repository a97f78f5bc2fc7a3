use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use amora_db::models::user::{PublicProfile, User};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get(user.0).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(alias = "displayName")]
    pub display_name: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    #[serde(alias = "birthDate")]
    pub birth_date: Option<NaiveDate>,
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let updated = state
        .users
        .update_profile(
            user.0,
            &payload.display_name,
            payload.bio.as_deref(),
            payload.gender.as_deref(),
            payload.birth_date,
        )
        .await?;
    Ok(Json(updated))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicProfile>, ApiError> {
    Ok(Json(state.users.public_profile(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    pub limit: Option<i64>,
}

pub async fn discover(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<Vec<PublicProfile>>, ApiError> {
    let limit = params.limit.unwrap_or(20);
    Ok(Json(state.users.discover(user.0, limit).await?))
}
