use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payment::PlanType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub plan_code: String,
    pub amount: i64,
    pub interval: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// Length of one billing period, derived from the interval column.
    /// Unknown intervals fall back to the monthly window.
    pub fn period(&self) -> Duration {
        match PlanType::parse(&self.interval) {
            Some(PlanType::Daily) => Duration::hours(24),
            _ => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    PastDue,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::PastDue => "past_due",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub subscription_code: String,
    pub email_token: Option<String>,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(interval: &str) -> SubscriptionPlan {
        SubscriptionPlan {
            id: 1,
            name: "Test".into(),
            plan_code: "PLN_test".into(),
            amount: 3000,
            interval: interval.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn plan_period_follows_interval() {
        assert_eq!(plan("daily").period(), Duration::hours(24));
        assert_eq!(plan("monthly").period(), Duration::days(30));
        assert_eq!(plan("lunar").period(), Duration::days(30));
    }
}
