use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification kinds emitted by the services. Stored as plain text so new
/// kinds do not require a migration.
pub mod kinds {
    pub const NEW_MATCH: &str = "new_match";
    pub const NEW_MESSAGE: &str = "new_message";
    pub const PAYMENT_PROCESSED: &str = "payment_processed";
    pub const SUBSCRIPTION_UPDATE: &str = "subscription_update";
}
