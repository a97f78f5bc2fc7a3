use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::json;

use amora_db::models::payment::PlanType;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InitializeChatPaymentRequest {
    pub amount: i64,
    #[serde(alias = "planType")]
    pub plan_type: String,
}

/// POST /payments/chat/initialize
pub async fn initialize_chat_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<InitializeChatPaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let plan = PlanType::parse(&payload.plan_type)
        .ok_or_else(|| ApiError::Validation("planType must be 'daily' or 'monthly'".into()))?;

    let charge = state
        .billing
        .initialize_chat_payment(user.0, payload.amount, plan)
        .await?;

    Ok(Json(json!({
        "payment_url": charge.payment_url,
        "reference": charge.reference,
        "amount": payload.amount,
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub reference: Option<String>,
}

/// POST /payments/chat/verify — `paid` reports whether the gateway confirmed
/// the charge; a reference already reconciled by the webhook still reports
/// paid without touching anything.
pub async fn verify_chat_payment(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reference = payload
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::Validation("reference is required".into()))?;

    let paid = state.billing.verify_chat_payment(reference).await?;
    Ok(Json(json!({ "paid": paid })))
}

/// GET /payments/chat/access
pub async fn chat_access(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = state.billing.chat_access(user.0).await?;
    Ok(Json(json!({
        "hasAccess": status.has_access,
        "paymentDate": status.payment_date,
    })))
}
