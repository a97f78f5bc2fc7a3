use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub match_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One row of the conversation list: a match, the peer's public identity and
/// the latest message if any.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConversationSummary {
    pub match_id: i64,
    pub peer_id: i64,
    pub peer_name: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}
