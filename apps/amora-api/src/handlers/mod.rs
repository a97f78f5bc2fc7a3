use axum::Json;
use serde_json::json;

pub mod auth;
pub mod chat;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod profiles;
pub mod subscriptions;
pub mod swipes;
pub mod webhooks;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
