use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::models::user::{PublicProfile, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Returns None when the email is already taken
    /// (unique-constraint backed, no check-then-insert race).
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to create user")?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by ID")?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: i64,
        display_name: &str,
        bio: Option<&str>,
        gender: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = $1, bio = $2, gender = $3, birth_date = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(display_name)
        .bind(bio)
        .bind(gender)
        .bind(birth_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update user profile")?;
        Ok(user)
    }

    pub async fn get_public_profile(&self, id: i64) -> Result<Option<PublicProfile>> {
        let profile = sqlx::query_as::<_, PublicProfile>(
            "SELECT id, display_name, bio, gender, birth_date FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch public profile")?;
        Ok(profile)
    }

    /// Candidates the user has not swiped on yet, excluding the user.
    pub async fn discover(&self, user_id: i64, limit: i64) -> Result<Vec<PublicProfile>> {
        let profiles = sqlx::query_as::<_, PublicProfile>(
            r#"
            SELECT u.id, u.display_name, u.bio, u.gender, u.birth_date
            FROM users u
            WHERE u.id <> $1
              AND NOT EXISTS (
                  SELECT 1 FROM swipes s WHERE s.swiper_id = $1 AND s.swiped_id = u.id
              )
            ORDER BY u.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch discovery candidates")?;
        Ok(profiles)
    }

    /// Record the reference of the payment currently in flight for the user.
    /// Only called from the reconciliation flows.
    pub async fn set_payment_reference(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
        reference: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET payment_reference = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(reference)
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("Failed to set payment reference")?;
        Ok(())
    }

    /// Grant chat access as part of a success transition. Runs inside the
    /// caller's transaction so the user row and the transaction row change
    /// together or not at all.
    pub async fn grant_chat_access(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
        reference: &str,
        paid_at: DateTime<Utc>,
        expiry: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET has_chat_access = TRUE,
                payment_date = $1,
                access_expiry_date = $2,
                payment_reference = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            "#,
        )
        .bind(paid_at)
        .bind(expiry)
        .bind(reference)
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("Failed to grant chat access")?;
        Ok(())
    }
}
