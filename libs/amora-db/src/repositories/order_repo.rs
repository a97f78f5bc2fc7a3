use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::order::{Order, OrderStatus};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent insert-or-fetch keyed by the order id. The insert is
    /// constraint-backed: two concurrent callers with the same id cannot
    /// create two rows, and a replayed id returns the existing row unchanged
    /// whatever amount the replay carried.
    pub async fn create_or_fetch(
        &self,
        id: &str,
        user_id: i64,
        amount: i64,
        metadata: serde_json::Value,
    ) -> Result<Order> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, amount, status, metadata)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(amount)
        .bind(OrderStatus::Pending.as_str())
        .bind(Json(metadata))
        .execute(&self.pool)
        .await
        .context("Failed to insert order")?;

        self.get_by_id(id)
            .await?
            .with_context(|| format!("Order {} missing after insert", id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch order")?;
        Ok(order)
    }

    pub async fn get_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user orders")?;
        Ok(orders)
    }
}
