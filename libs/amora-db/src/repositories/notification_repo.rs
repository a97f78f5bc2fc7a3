use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::notification::Notification;

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, kind: &str, body: &str) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, kind, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(kind)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert notification")?;
        Ok(notification)
    }

    /// Variant used inside reconciliation transactions so the notification
    /// commits (or rolls back) with the state change that caused it.
    pub async fn create_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
        kind: &str,
        body: &str,
    ) -> Result<()> {
        sqlx::query("INSERT INTO notifications (user_id, kind, body) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(kind)
            .bind(body)
            .execute(&mut **tx)
            .await
            .context("Failed to insert notification")?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch notifications")?;
        Ok(notifications)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .context("Failed to mark notifications read")?;
        Ok(result.rows_affected())
    }

    pub async fn mark_read(&self, user_id: i64, ids: &[i64]) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .context("Failed to mark notifications read")?;
        Ok(result.rows_affected())
    }
}
