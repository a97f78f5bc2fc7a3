use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;

use amora_db::models::order::Order;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: i64,
    /// Optional caller-supplied idempotency key. Re-posting the same id
    /// returns the stored order unchanged.
    pub id: Option<String>,
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .billing
        .create_order(user.0, payload.amount, payload.id)
        .await?;
    Ok(Json(order))
}
