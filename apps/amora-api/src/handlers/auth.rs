use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use amora_db::models::user::User;

use crate::auth::issue_token;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .register(&payload.email, &payload.password, &payload.display_name)
        .await?;
    let token = issue_token(user.id, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse { token, user }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state.users.login(&payload.email, &payload.password).await?;
    let token = issue_token(user.id, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse { token, user }))
}
