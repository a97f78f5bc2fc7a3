use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::message::{ChatMessage, ConversationSummary};

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, match_id: i64, sender_id: i64, body: &str) -> Result<ChatMessage> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO messages (match_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(match_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert message")?;
        Ok(message)
    }

    pub async fn list_for_match(&self, match_id: i64, limit: i64) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM (
                SELECT * FROM messages WHERE match_id = $1 ORDER BY created_at DESC LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(match_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch messages")?;
        Ok(messages)
    }

    /// Mark everything the peer sent in this match as read.
    pub async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE messages
            SET read_at = CURRENT_TIMESTAMP
            WHERE match_id = $1 AND sender_id <> $2 AND read_at IS NULL
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await
        .context("Failed to mark messages read")?;
        Ok(())
    }

    /// Conversation list for a user: every match with the peer's name, the
    /// latest message and the unread count, newest activity first.
    pub async fn conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        let conversations = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT
                m.id AS match_id,
                peer.id AS peer_id,
                peer.display_name AS peer_name,
                last.body AS last_message,
                last.created_at AS last_message_at,
                COALESCE(unread.count, 0) AS unread_count
            FROM matches m
            JOIN users peer
              ON peer.id = CASE WHEN m.user_a = $1 THEN m.user_b ELSE m.user_a END
            LEFT JOIN LATERAL (
                SELECT body, created_at FROM messages
                WHERE match_id = m.id
                ORDER BY created_at DESC
                LIMIT 1
            ) last ON TRUE
            LEFT JOIN LATERAL (
                SELECT COUNT(*) AS count FROM messages
                WHERE match_id = m.id AND sender_id <> $1 AND read_at IS NULL
            ) unread ON TRUE
            WHERE m.user_a = $1 OR m.user_b = $1
            ORDER BY COALESCE(last.created_at, m.created_at) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch conversations")?;
        Ok(conversations)
    }
}
