use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::subscription::{Subscription, SubscriptionPlan, SubscriptionStatus};

#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE active = TRUE ORDER BY amount",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch active plans")?;
        Ok(plans)
    }

    pub async fn plan_by_id(&self, id: i64) -> Result<Option<SubscriptionPlan>> {
        let plan =
            sqlx::query_as::<_, SubscriptionPlan>("SELECT * FROM subscription_plans WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch plan by ID")?;
        Ok(plan)
    }

    pub async fn plan_by_code(&self, plan_code: &str) -> Result<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE plan_code = $1",
        )
        .bind(plan_code)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch plan by code")?;
        Ok(plan)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        let sub = sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch subscription")?;
        Ok(sub)
    }

    pub async fn get_for_user(&self, user_id: i64) -> Result<Vec<Subscription>> {
        let subs = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user subscriptions")?;
        Ok(subs)
    }

    /// Row-locked lookup by the gateway's correlating code; webhook lifecycle
    /// events serialize on this before mutating.
    pub async fn find_by_code_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        subscription_code: &str,
    ) -> Result<Option<Subscription>> {
        let sub = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE subscription_code = $1 FOR UPDATE",
        )
        .bind(subscription_code)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to lock subscription by code")?;
        Ok(sub)
    }

    /// Constraint-backed idempotent activation: a replayed subscription.create
    /// event for the same code inserts nothing.
    pub async fn create_active(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
        plan_id: i64,
        subscription_code: &str,
        email_token: Option<&str>,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_id, subscription_code, email_token, status,
                 current_period_start, current_period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (subscription_code) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(subscription_code)
        .bind(email_token)
        .bind(SubscriptionStatus::Active.as_str())
        .bind(period_start)
        .bind(period_end)
        .execute(&mut **tx)
        .await
        .context("Failed to insert subscription")?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
        status: SubscriptionStatus,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE subscriptions SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("Failed to update subscription status")?;
        Ok(())
    }

    pub async fn renew_period(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1, current_period_start = $2, current_period_end = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            "#,
        )
        .bind(SubscriptionStatus::Active.as_str())
        .bind(period_start)
        .bind(period_end)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("Failed to renew subscription period")?;
        Ok(())
    }
}
