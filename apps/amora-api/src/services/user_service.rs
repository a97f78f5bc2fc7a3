use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

use amora_db::models::user::{PublicProfile, User};
use amora_db::repositories::user_repo::UserRepository;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { users: UserRepository::new(pool) }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') || !email.contains('.') {
            return Err(ApiError::Validation("invalid email address".into()));
        }
        if password.len() < 8 {
            return Err(ApiError::Validation("password must be at least 8 characters".into()));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ApiError::Validation("display name is required".into()));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;

        let user = self
            .users
            .create(&email, &password_hash, display_name)
            .await?
            .ok_or_else(|| ApiError::Validation("email is already registered".into()))?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;

        let valid = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(ApiError::Unauthorized("invalid credentials".into()));
        }
        Ok(user)
    }

    pub async fn get(&self, user_id: i64) -> Result<User, ApiError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }

    pub async fn public_profile(&self, user_id: i64) -> Result<PublicProfile, ApiError> {
        self.users
            .get_public_profile(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        display_name: &str,
        bio: Option<&str>,
        gender: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> Result<User, ApiError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ApiError::Validation("display name is required".into()));
        }

        self.users
            .update_profile(user_id, display_name, bio, gender, birth_date)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }

    pub async fn discover(&self, user_id: i64, limit: i64) -> Result<Vec<PublicProfile>, ApiError> {
        Ok(self.users.discover(user_id, limit.clamp(1, 100)).await?)
    }
}
