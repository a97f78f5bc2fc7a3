use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::matching::{Match, SwipeDirection, ordered_pair};

#[derive(Debug, Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a swipe. The first swipe on a target wins; replays change
    /// nothing (unique on swiper/swiped).
    pub async fn record_swipe(
        &self,
        swiper_id: i64,
        swiped_id: i64,
        direction: SwipeDirection,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO swipes (swiper_id, swiped_id, direction)
            VALUES ($1, $2, $3)
            ON CONFLICT (swiper_id, swiped_id) DO NOTHING
            "#,
        )
        .bind(swiper_id)
        .bind(swiped_id)
        .bind(direction.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to record swipe")?;
        Ok(())
    }

    pub async fn has_like(&self, swiper_id: i64, swiped_id: i64) -> Result<bool> {
        let liked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM swipes
                WHERE swiper_id = $1 AND swiped_id = $2 AND direction = 'like'
            )
            "#,
        )
        .bind(swiper_id)
        .bind(swiped_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check for reciprocal like")?;
        Ok(liked)
    }

    /// Create the match for a crossing like, conflict-safe: both swipe orders
    /// resolve to the same ordered pair, so racing inserts collapse into one
    /// row. Returns the match either way.
    pub async fn create_match(&self, a: i64, b: i64) -> Result<Match> {
        let (user_a, user_b) = ordered_pair(a, b);
        sqlx::query("INSERT INTO matches (user_a, user_b) VALUES ($1, $2) ON CONFLICT (user_a, user_b) DO NOTHING")
            .bind(user_a)
            .bind(user_b)
            .execute(&self.pool)
            .await
            .context("Failed to insert match")?;

        self.find_pair(user_a, user_b)
            .await?
            .context("Match missing after insert")
    }

    pub async fn find_pair(&self, user_a: i64, user_b: i64) -> Result<Option<Match>> {
        let m = sqlx::query_as::<_, Match>(
            "SELECT * FROM matches WHERE user_a = $1 AND user_b = $2",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch match pair")?;
        Ok(m)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Match>> {
        let m = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch match")?;
        Ok(m)
    }

    pub async fn matches_for(&self, user_id: i64) -> Result<Vec<Match>> {
        let matches = sqlx::query_as::<_, Match>(
            "SELECT * FROM matches WHERE user_a = $1 OR user_b = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch matches")?;
        Ok(matches)
    }
}
