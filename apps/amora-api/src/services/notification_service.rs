use sqlx::PgPool;

use amora_db::models::notification::Notification;
use amora_db::repositories::notification_repo::NotificationRepository;

use crate::error::ApiError;

const NOTIFICATION_PAGE: i64 = 50;

#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { notifications: NotificationRepository::new(pool) }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Notification>, ApiError> {
        Ok(self.notifications.list_for_user(user_id, NOTIFICATION_PAGE).await?)
    }

    /// Mark the given ids read, or everything when no ids are passed.
    pub async fn mark_read(&self, user_id: i64, ids: Option<Vec<i64>>) -> Result<u64, ApiError> {
        let updated = match ids {
            Some(ids) if !ids.is_empty() => self.notifications.mark_read(user_id, &ids).await?,
            _ => self.notifications.mark_all_read(user_id).await?,
        };
        Ok(updated)
    }
}
