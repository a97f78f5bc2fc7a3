use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Billing duration for a one-off chat access purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Monthly,
}

impl PlanType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// Access window granted by a successful payment for this plan.
    pub fn access_expiry(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Daily => from + Duration::hours(24),
            Self::Monthly => from + Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// What a transaction paid for, stored in the `metadata` JSONB column and
/// tagged by `service_type`. Decoded at the boundary; the core logic never
/// sees untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service_type", rename_all = "snake_case")]
pub enum TransactionMetadata {
    ChatAccess { plan: PlanType },
    Subscription { plan_code: String },
}

impl TransactionMetadata {
    /// Value for the queryable `service_type` column, kept in sync with the
    /// serde tag.
    pub fn service_type(&self) -> &'static str {
        match self {
            Self::ChatAccess { .. } => "chat_access",
            Self::Subscription { .. } => "subscription",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentTransaction {
    pub id: i64,
    pub user_id: i64,
    pub order_id: Option<String>,
    pub reference: String,
    pub provider_txn_id: Option<String>,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    pub service_type: String,
    pub metadata: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::Success.as_str()
    }

    /// Decode the typed metadata. Rows written by older builds or with an
    /// unrecognized tag come back as None and callers fall back to defaults.
    pub fn decoded_metadata(&self) -> Option<TransactionMetadata> {
        serde_json::from_value(self.metadata.0.clone()).ok()
    }

    /// Expiry granted when this transaction succeeds: plan-based for chat
    /// access, immediate (now) when the plan cannot be determined.
    pub fn access_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.decoded_metadata() {
            Some(TransactionMetadata::ChatAccess { plan }) => plan.access_expiry(now),
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_type_parse_roundtrip() {
        assert_eq!(PlanType::parse("daily"), Some(PlanType::Daily));
        assert_eq!(PlanType::parse("monthly"), Some(PlanType::Monthly));
        assert_eq!(PlanType::parse("weekly"), None);
        assert_eq!(PlanType::Daily.as_str(), "daily");
    }

    #[test]
    fn daily_plan_expires_after_24h() {
        let now = Utc::now();
        assert_eq!(PlanType::Daily.access_expiry(now), now + Duration::hours(24));
    }

    #[test]
    fn monthly_plan_expires_after_30d() {
        let now = Utc::now();
        assert_eq!(PlanType::Monthly.access_expiry(now), now + Duration::days(30));
    }

    #[test]
    fn metadata_tagged_by_service_type() {
        let meta = TransactionMetadata::ChatAccess { plan: PlanType::Monthly };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value, json!({"service_type": "chat_access", "plan": "monthly"}));
        assert_eq!(meta.service_type(), "chat_access");

        let back: TransactionMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }

    fn txn(metadata: serde_json::Value) -> PaymentTransaction {
        PaymentTransaction {
            id: 1,
            user_id: 1,
            order_id: None,
            reference: "ref".into(),
            provider_txn_id: None,
            amount: 3000,
            status: "pending".into(),
            payment_method: "card".into(),
            service_type: "chat_access".into(),
            metadata: Json(metadata),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_from_chat_access_metadata() {
        let now = Utc::now();
        let t = txn(json!({"service_type": "chat_access", "plan": "daily"}));
        assert_eq!(t.access_expiry(now), now + Duration::hours(24));
    }

    #[test]
    fn unknown_metadata_grants_no_window() {
        let now = Utc::now();
        let t = txn(json!({"service_type": "mystery"}));
        assert_eq!(t.access_expiry(now), now);
        assert_eq!(t.decoded_metadata(), None);
    }
}
