use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use amora_db::models::notification::kinds;
use amora_db::models::payment::TransactionMetadata;
use amora_db::models::subscription::{Subscription, SubscriptionPlan, SubscriptionStatus};
use amora_db::repositories::notification_repo::NotificationRepository;
use amora_db::repositories::payment_repo::PaymentRepository;
use amora_db::repositories::subscription_repo::SubscriptionRepository;
use amora_db::repositories::user_repo::UserRepository;

use crate::error::ApiError;
use crate::services::payment::{InitializedCharge, PaymentGateway};

/// Recurring-billing flows and the subscription lifecycle webhook events.
/// Follows the same discipline as the one-off flow: correlate by the
/// gateway code, lock, re-check, update idempotently.
#[derive(Clone)]
pub struct SubscriptionService {
    pool: PgPool,
    subscriptions: SubscriptionRepository,
    payments: PaymentRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl SubscriptionService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
            gateway,
        }
    }

    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, ApiError> {
        Ok(self.subscriptions.active_plans().await?)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Subscription>, ApiError> {
        Ok(self.subscriptions.get_for_user(user_id).await?)
    }

    /// Start a hosted checkout for a recurring plan. The subscription row
    /// itself is created later by the subscription.create webhook.
    pub async fn initialize(
        &self,
        user_id: i64,
        plan_id: i64,
    ) -> Result<InitializedCharge, ApiError> {
        let plan = self
            .subscriptions
            .plan_by_id(plan_id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| ApiError::Validation("unknown or inactive plan".into()))?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        let reference = format!("amora_{}", Uuid::new_v4().simple());
        let charge = self
            .gateway
            .initialize_subscription(&user.email, &plan.plan_code, &reference)
            .await?;

        let metadata = TransactionMetadata::Subscription { plan_code: plan.plan_code.clone() };

        let mut tx = self.pool.begin().await?;
        self.payments
            .create_pending(
                &mut tx,
                user_id,
                None,
                &charge.reference,
                plan.amount,
                "card",
                &metadata,
            )
            .await?;
        tx.commit().await?;

        info!(
            "Initialized subscription checkout for user {} on plan {} (reference {})",
            user_id, plan.plan_code, charge.reference
        );
        Ok(charge)
    }

    /// Cancel at the gateway first, then mark the row. A row already
    /// cancelled is a no-op success.
    pub async fn cancel(&self, user_id: i64, subscription_id: i64) -> Result<(), ApiError> {
        let sub = self
            .subscriptions
            .get_by_id(subscription_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound("subscription not found".into()))?;

        if !sub.is_active() {
            return Ok(());
        }

        let email_token = sub.email_token.as_deref().unwrap_or_default();
        self.gateway
            .disable_subscription(&sub.subscription_code, email_token)
            .await?;

        let mut tx = self.pool.begin().await?;
        self.subscriptions
            .update_status(&mut tx, sub.id, SubscriptionStatus::Cancelled)
            .await?;
        tx.commit().await?;
        info!("Subscription {} cancelled by user {}", sub.subscription_code, user_id);
        Ok(())
    }

    /// subscription.create webhook: resolve the plan and the customer, then
    /// insert-or-ignore keyed by the subscription code.
    pub async fn activate_from_webhook(
        &self,
        subscription_code: &str,
        plan_code: &str,
        customer_email: &str,
        email_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let Some(plan) = self.subscriptions.plan_by_code(plan_code).await? else {
            warn!("subscription.create for unknown plan {}, ignoring", plan_code);
            return Ok(());
        };
        let Some(user) = self.users.get_by_email(customer_email).await? else {
            warn!(
                "subscription.create for unknown customer {}, ignoring",
                customer_email
            );
            return Ok(());
        };

        let now = Utc::now();
        let period_end = now + plan.period();
        let mut tx = self.pool.begin().await?;

        if let Some(existing) = self
            .subscriptions
            .find_by_code_for_update(&mut tx, subscription_code)
            .await?
        {
            if existing.is_active() {
                info!("Subscription {} already active, ignoring", subscription_code);
                return Ok(());
            }
            self.subscriptions
                .renew_period(&mut tx, existing.id, now, period_end)
                .await?;
        } else {
            self.subscriptions
                .create_active(
                    &mut tx,
                    user.id,
                    plan.id,
                    subscription_code,
                    email_token,
                    now,
                    period_end,
                )
                .await?;
        }

        // An active subscription carries chat access for the billing period.
        self.users
            .grant_chat_access(&mut tx, user.id, subscription_code, now, Some(period_end))
            .await?;
        self.notifications
            .create_in_tx(
                &mut tx,
                user.id,
                kinds::SUBSCRIPTION_UPDATE,
                "Your subscription is now active.",
            )
            .await?;
        tx.commit().await?;
        info!("Subscription {} active for user {}", subscription_code, user.id);
        Ok(())
    }

    /// invoice.update webhook: a settled renewal invoice rolls the billing
    /// window forward and extends the access grant with it.
    pub async fn renew_from_webhook(&self, subscription_code: &str) -> Result<(), ApiError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let Some(sub) = self
            .subscriptions
            .find_by_code_for_update(&mut tx, subscription_code)
            .await?
        else {
            warn!("Renewal for unknown subscription {}, ignoring", subscription_code);
            return Ok(());
        };

        let Some(plan) = self.subscriptions.plan_by_id(sub.plan_id).await? else {
            warn!("Subscription {} references a missing plan, ignoring", subscription_code);
            return Ok(());
        };

        let period_end = now + plan.period();
        self.subscriptions
            .renew_period(&mut tx, sub.id, now, period_end)
            .await?;
        self.users
            .grant_chat_access(&mut tx, sub.user_id, subscription_code, now, Some(period_end))
            .await?;
        tx.commit().await?;
        info!("Subscription {} renewed until {}", subscription_code, period_end);
        Ok(())
    }

    /// subscription.disable / invoice.payment_failed webhooks: idempotent
    /// status downgrade by code. Unknown codes are acknowledged no-ops.
    pub async fn mark_from_webhook(
        &self,
        subscription_code: &str,
        status: SubscriptionStatus,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        let Some(sub) = self
            .subscriptions
            .find_by_code_for_update(&mut tx, subscription_code)
            .await?
        else {
            warn!("Lifecycle event for unknown subscription {}, ignoring", subscription_code);
            return Ok(());
        };

        if sub.status == status.as_str() {
            info!("Subscription {} already {}, ignoring", subscription_code, sub.status);
            return Ok(());
        }

        self.subscriptions.update_status(&mut tx, sub.id, status).await?;
        self.notifications
            .create_in_tx(
                &mut tx,
                sub.user_id,
                kinds::SUBSCRIPTION_UPDATE,
                &format!("Your subscription is now {}.", status.as_str()),
            )
            .await?;
        tx.commit().await?;
        info!("Subscription {} moved to {}", subscription_code, status.as_str());
        Ok(())
    }
}
