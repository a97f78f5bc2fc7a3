use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::json;

use amora_db::models::subscription::{Subscription, SubscriptionPlan};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    Ok(Json(state.subscriptions.list_plans().await?))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    Ok(Json(state.subscriptions.list_for_user(user.0).await?))
}

#[derive(Debug, Deserialize)]
pub struct InitializeSubscriptionRequest {
    #[serde(alias = "planId")]
    pub plan_id: i64,
}

pub async fn initialize_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<InitializeSubscriptionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let charge = state.subscriptions.initialize(user.0, payload.plan_id).await?;
    Ok(Json(json!({
        "payment_url": charge.payment_url,
        "reference": charge.reference,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CancelSubscriptionRequest {
    #[serde(alias = "subscriptionId")]
    pub subscription_id: i64,
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CancelSubscriptionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .subscriptions
        .cancel(user.0, payload.subscription_id)
        .await?;
    Ok(Json(json!({ "cancelled": true })))
}
