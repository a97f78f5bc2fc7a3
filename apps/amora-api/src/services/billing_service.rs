use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use amora_db::models::notification::kinds;
use amora_db::models::order::Order;
use amora_db::models::payment::{PlanType, TransactionMetadata};
use amora_db::repositories::notification_repo::NotificationRepository;
use amora_db::repositories::order_repo::OrderRepository;
use amora_db::repositories::payment_repo::PaymentRepository;
use amora_db::repositories::user_repo::UserRepository;

use crate::error::ApiError;
use crate::services::payment::{InitializedCharge, PaymentGateway};

#[derive(Debug, Clone)]
pub struct AccessStatus {
    pub has_access: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Order creation, payment initialization and the success reconciliation for
/// one-off chat access purchases. This is the only code that mutates the
/// entitlement fields on users.
#[derive(Clone)]
pub struct BillingService {
    pool: PgPool,
    orders: OrderRepository,
    payments: PaymentRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl BillingService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            orders: OrderRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
            gateway,
        }
    }

    /// Idempotent order registration. A replayed id returns the stored row
    /// unchanged; no gateway contact happens here.
    pub async fn create_order(
        &self,
        user_id: i64,
        amount: i64,
        id: Option<String>,
    ) -> Result<Order, ApiError> {
        validate_amount(amount)?;

        let id = match id.filter(|s| !s.trim().is_empty()) {
            Some(id) => id,
            None => format!("order_{}", Uuid::new_v4().simple()),
        };

        let order = self
            .orders
            .create_or_fetch(&id, user_id, amount, serde_json::json!({}))
            .await?;
        Ok(order)
    }

    /// Initialize a hosted-checkout charge for chat access. The gateway is
    /// called first; the pending ledger row is written before the user's
    /// payment_reference, both in one transaction, so a failed insert never
    /// leaves a dangling reference on the user.
    pub async fn initialize_chat_payment(
        &self,
        user_id: i64,
        amount: i64,
        plan: PlanType,
    ) -> Result<InitializedCharge, ApiError> {
        validate_amount(amount)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        let reference = format!("amora_{}", Uuid::new_v4().simple());
        let charge = self
            .gateway
            .initialize_charge(&user.email, amount, &reference)
            .await?;

        let metadata = TransactionMetadata::ChatAccess { plan };

        let mut tx = self.pool.begin().await?;
        self.payments
            .create_pending(&mut tx, user_id, None, &charge.reference, amount, "card", &metadata)
            .await?;
        self.users
            .set_payment_reference(&mut tx, user_id, &charge.reference)
            .await?;
        tx.commit().await?;

        info!(
            "Initialized {} chat payment for user {} (reference {})",
            plan.as_str(),
            user_id,
            charge.reference
        );
        Ok(charge)
    }

    /// Client-initiated verification. Asks the gateway first, outside any
    /// lock; only a gateway-confirmed success opens the reconciliation
    /// transaction. Returns whether the charge is paid.
    pub async fn verify_chat_payment(&self, reference: &str) -> Result<bool, ApiError> {
        let charge = self.gateway.verify_charge(reference).await?;
        if !charge.success {
            info!("Verify: reference {} still {}", reference, charge.status);
            return Ok(false);
        }

        self.apply_success(reference, charge.provider_txn_id.as_deref())
            .await?;
        Ok(true)
    }

    /// Process a charge.success webhook event. Unknown references and
    /// replayed events are acknowledged no-ops.
    pub async fn process_charge_success(
        &self,
        reference: &str,
        provider_txn_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.apply_success(reference, provider_txn_id).await
    }

    /// The single success transition for a reference. Row lock plus status
    /// re-check means whichever of verify/webhook gets here first wins and
    /// the other detects the applied state and skips.
    async fn apply_success(
        &self,
        reference: &str,
        provider_txn_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        let txn = match self
            .payments
            .find_by_reference_for_update(&mut tx, reference)
            .await?
        {
            Some(txn) => txn,
            None => {
                warn!("Success event for unknown reference {}, ignoring", reference);
                return Ok(());
            }
        };

        if txn.is_success() {
            info!("Reference {} already reconciled, ignoring", reference);
            return Ok(());
        }

        let now = Utc::now();
        self.payments
            .mark_success(&mut tx, txn.id, provider_txn_id)
            .await?;

        // Recurring-billing charges settle the ledger row only; entitlement
        // for those is driven by the subscription lifecycle events.
        if let Some(TransactionMetadata::Subscription { .. }) = txn.decoded_metadata() {
            tx.commit().await?;
            info!("Reference {} (subscription charge) settled", reference);
            return Ok(());
        }

        let expiry = txn.access_expiry(now);
        self.users
            .grant_chat_access(&mut tx, txn.user_id, reference, now, Some(expiry))
            .await?;
        self.notifications
            .create_in_tx(
                &mut tx,
                txn.user_id,
                kinds::PAYMENT_PROCESSED,
                "Your payment was received. Chat is unlocked!",
            )
            .await?;

        tx.commit().await?;
        info!(
            "Reference {} reconciled: user {} granted chat access until {}",
            reference, txn.user_id, expiry
        );
        Ok(())
    }

    /// Current entitlement snapshot, expiry enforced on read.
    pub async fn chat_access(&self, user_id: i64) -> Result<AccessStatus, ApiError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        Ok(AccessStatus {
            has_access: user.chat_access_active(Utc::now()),
            payment_date: user.payment_date,
        })
    }

    /// Gate check for the messaging endpoints. Reads the row fresh on every
    /// request; nothing is cached across requests.
    pub async fn ensure_chat_access(&self, user_id: i64) -> Result<(), ApiError> {
        let status = self.chat_access(user_id).await?;
        if !status.has_access {
            return Err(ApiError::PaymentRequired);
        }
        Ok(())
    }
}

pub fn validate_amount(amount: i64) -> Result<(), ApiError> {
    if amount <= 0 {
        return Err(ApiError::Validation("amount must be a positive integer".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-100).is_err());
        assert!(validate_amount(1).is_ok());
    }
}
