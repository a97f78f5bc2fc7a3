use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use amora_db::models::subscription::SubscriptionStatus;

use crate::error::ApiError;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Gateway event envelope. `data` stays raw here; each event type pulls out
/// the fields it needs.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub fn parse_envelope(body: &[u8]) -> Option<WebhookEnvelope> {
    serde_json::from_slice(body).ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeEventData {
    pub reference: String,
    pub provider_txn_id: Option<String>,
}

pub fn extract_charge(data: &serde_json::Value) -> Option<ChargeEventData> {
    let reference = data.get("reference")?.as_str()?.to_string();
    let provider_txn_id = data.get("id").map(|id| match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    Some(ChargeEventData { reference, provider_txn_id })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionEventData {
    pub subscription_code: String,
    pub plan_code: Option<String>,
    pub customer_email: Option<String>,
    pub email_token: Option<String>,
}

pub fn extract_subscription(data: &serde_json::Value) -> Option<SubscriptionEventData> {
    // Lifecycle events carry the code at the top level; invoice events nest
    // it under a subscription object.
    let subscription_code = data
        .get("subscription_code")
        .or_else(|| data.pointer("/subscription/subscription_code"))?
        .as_str()?
        .to_string();
    Some(SubscriptionEventData {
        subscription_code,
        plan_code: data
            .pointer("/plan/plan_code")
            .and_then(|v| v.as_str())
            .map(String::from),
        customer_email: data
            .pointer("/customer/email")
            .and_then(|v| v.as_str())
            .map(String::from),
        email_token: data.get("email_token").and_then(|v| v.as_str()).map(String::from),
    })
}

/// POST /payments/subscription/webhook
///
/// Authenticity first, then dispatch. Events that cannot be correlated are
/// acknowledged anyway: the gateway retries on anything but a 2xx, and an
/// unknown reference will not become known by redelivery.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.config.is_production() && state.config.paystack_secret_key.is_empty() {
        return Err(ApiError::Misconfigured("webhook secret is not configured".into()));
    }

    // Local testing without a secret skips verification; anything else is
    // checked against the raw body before the payload is trusted.
    let bypass = !state.config.is_production() && state.config.paystack_secret_key.is_empty();
    if !bypass {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        state
            .gateway
            .verify_signature(&body, signature)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
    }

    let Some(envelope) = parse_envelope(&body) else {
        warn!("Unparseable webhook payload, acknowledging");
        return Ok(Json(json!({ "status": "success" })));
    };

    match envelope.event.as_str() {
        "charge.success" => match extract_charge(&envelope.data) {
            Some(charge) => {
                state
                    .billing
                    .process_charge_success(&charge.reference, charge.provider_txn_id.as_deref())
                    .await?;
            }
            None => warn!("charge.success without a reference, acknowledging"),
        },
        "subscription.create" => match extract_subscription(&envelope.data) {
            Some(sub) => {
                let plan_code = sub.plan_code.unwrap_or_default();
                let customer_email = sub.customer_email.unwrap_or_default();
                state
                    .subscriptions
                    .activate_from_webhook(
                        &sub.subscription_code,
                        &plan_code,
                        &customer_email,
                        sub.email_token.as_deref(),
                    )
                    .await?;
            }
            None => warn!("subscription.create without a code, acknowledging"),
        },
        "subscription.disable" | "subscription.not_renew" => {
            match extract_subscription(&envelope.data) {
                Some(sub) => {
                    state
                        .subscriptions
                        .mark_from_webhook(&sub.subscription_code, SubscriptionStatus::Cancelled)
                        .await?;
                }
                None => warn!("subscription.disable without a code, acknowledging"),
            }
        }
        "invoice.update" => match extract_subscription(&envelope.data) {
            Some(sub) => {
                state
                    .subscriptions
                    .renew_from_webhook(&sub.subscription_code)
                    .await?;
            }
            None => warn!("invoice.update without a code, acknowledging"),
        },
        "invoice.payment_failed" => match extract_subscription(&envelope.data) {
            Some(sub) => {
                state
                    .subscriptions
                    .mark_from_webhook(&sub.subscription_code, SubscriptionStatus::PastDue)
                    .await?;
            }
            None => warn!("invoice.payment_failed without a code, acknowledging"),
        },
        other => info!("Ignoring webhook event {}", other),
    }

    Ok(Json(json!({ "status": "success" })))
}
