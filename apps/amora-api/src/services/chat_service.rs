use sqlx::PgPool;

use amora_db::models::matching::Match;
use amora_db::models::message::{ChatMessage, ConversationSummary};
use amora_db::models::notification::kinds;
use amora_db::repositories::match_repo::MatchRepository;
use amora_db::repositories::message_repo::MessageRepository;
use amora_db::repositories::notification_repo::NotificationRepository;

use crate::error::ApiError;
use crate::ws::{ChatEvent, ChatHub};

const MESSAGE_PAGE: i64 = 100;
const MAX_BODY_LEN: usize = 2000;

#[derive(Clone)]
pub struct ChatService {
    matches: MatchRepository,
    messages: MessageRepository,
    notifications: NotificationRepository,
    hub: ChatHub,
}

impl ChatService {
    pub fn new(pool: PgPool, hub: ChatHub) -> Self {
        Self {
            matches: MatchRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
            hub,
        }
    }

    async fn member_match(&self, match_id: i64, user_id: i64) -> Result<Match, ApiError> {
        let m = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("match not found".into()))?;
        if !m.involves(user_id) {
            return Err(ApiError::Forbidden("not a member of this match".into()));
        }
        Ok(m)
    }

    pub async fn conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ApiError> {
        Ok(self.messages.conversations(user_id).await?)
    }

    /// Fetching a conversation also marks the peer's messages as read.
    pub async fn messages(
        &self,
        user_id: i64,
        match_id: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        self.member_match(match_id, user_id).await?;
        let messages = self.messages.list_for_match(match_id, MESSAGE_PAGE).await?;
        self.messages.mark_read(match_id, user_id).await?;
        Ok(messages)
    }

    /// Store the message, relay it to the peer's live sockets and leave a
    /// notification for when they are offline.
    pub async fn send_message(
        &self,
        sender_id: i64,
        match_id: i64,
        body: &str,
    ) -> Result<ChatMessage, ApiError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ApiError::Validation("message body is required".into()));
        }
        if body.len() > MAX_BODY_LEN {
            return Err(ApiError::Validation("message body is too long".into()));
        }

        let m = self.member_match(match_id, sender_id).await?;
        let peer_id = m.peer_of(sender_id);

        let message = self.messages.create(match_id, sender_id, body).await?;

        self.hub.send_to(peer_id, &ChatEvent::message_created(&message));
        self.notifications
            .create(peer_id, kinds::NEW_MESSAGE, "You have a new message.")
            .await?;

        Ok(message)
    }
}
