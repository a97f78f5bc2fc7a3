use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::payment::{PaymentTransaction, TransactionMetadata, TransactionStatus};

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending ledger row for a freshly initialized payment. Runs in
    /// the caller's transaction so the row and the user's payment_reference
    /// commit together.
    pub async fn create_pending(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
        order_id: Option<&str>,
        reference: &str,
        amount: i64,
        payment_method: &str,
        metadata: &TransactionMetadata,
    ) -> Result<PaymentTransaction> {
        let metadata_json =
            serde_json::to_value(metadata).context("Failed to encode transaction metadata")?;

        let txn = sqlx::query_as::<_, PaymentTransaction>(
            r#"
            INSERT INTO payment_transactions
                (user_id, order_id, reference, amount, status, payment_method, service_type, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .bind(reference)
        .bind(amount)
        .bind(TransactionStatus::Pending.as_str())
        .bind(payment_method)
        .bind(metadata.service_type())
        .bind(Json(metadata_json))
        .fetch_one(&mut **tx)
        .await
        .context("Failed to insert pending transaction")?;
        Ok(txn)
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentTransaction>> {
        let txn = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE reference = $1",
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction by reference")?;
        Ok(txn)
    }

    /// Row-locked lookup used by both the webhook and the synchronous verify
    /// path. Serializes concurrent success attempts for one reference; the
    /// caller re-checks status before mutating.
    pub async fn find_by_reference_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reference: &str,
    ) -> Result<Option<PaymentTransaction>> {
        let txn = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE reference = $1 FOR UPDATE",
        )
        .bind(reference)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to lock transaction by reference")?;
        Ok(txn)
    }

    pub async fn mark_success(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
        provider_txn_id: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = $1,
                provider_txn_id = COALESCE($2, provider_txn_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            "#,
        )
        .bind(TransactionStatus::Success.as_str())
        .bind(provider_txn_id)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("Failed to mark transaction success")?;
        Ok(())
    }

    pub async fn get_for_user(&self, user_id: i64) -> Result<Vec<PaymentTransaction>> {
        let txns = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user transactions")?;
        Ok(txns)
    }
}
