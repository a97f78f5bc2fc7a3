use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use amora_db::models::matching::{Match, SwipeDirection};
use amora_db::models::notification::kinds;
use amora_db::repositories::match_repo::MatchRepository;
use amora_db::repositories::notification_repo::NotificationRepository;
use amora_db::repositories::user_repo::UserRepository;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct SwipeOutcome {
    pub matched: bool,
    pub match_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct MatchService {
    matches: MatchRepository,
    users: UserRepository,
    notifications: NotificationRepository,
}

impl MatchService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            matches: MatchRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }

    /// Record a swipe; a crossing like creates the match and notifies both
    /// sides.
    pub async fn swipe(
        &self,
        swiper_id: i64,
        target_id: i64,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, ApiError> {
        if swiper_id == target_id {
            return Err(ApiError::Validation("you cannot swipe on yourself".into()));
        }
        let target = self
            .users
            .get_by_id(target_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        self.matches.record_swipe(swiper_id, target_id, direction).await?;

        if direction != SwipeDirection::Like {
            return Ok(SwipeOutcome { matched: false, match_id: None });
        }

        if !self.matches.has_like(target_id, swiper_id).await? {
            return Ok(SwipeOutcome { matched: false, match_id: None });
        }

        let m = self.matches.create_match(swiper_id, target_id).await?;
        info!("Match {} created between {} and {}", m.id, m.user_a, m.user_b);

        let swiper = self.users.get_by_id(swiper_id).await?;
        let swiper_name = swiper.map(|u| u.display_name).unwrap_or_else(|| "Someone".into());
        self.notifications
            .create(
                target_id,
                kinds::NEW_MATCH,
                &format!("You matched with {}!", swiper_name),
            )
            .await?;
        self.notifications
            .create(
                swiper_id,
                kinds::NEW_MATCH,
                &format!("You matched with {}!", target.display_name),
            )
            .await?;

        Ok(SwipeOutcome { matched: true, match_id: Some(m.id) })
    }

    pub async fn matches_for(&self, user_id: i64) -> Result<Vec<Match>, ApiError> {
        Ok(self.matches.matches_for(user_id).await?)
    }
}
