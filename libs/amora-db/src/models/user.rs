use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub has_chat_access: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub access_expiry_date: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current entitlement to the chat feature. An expired grant counts as
    /// revoked even while the stored flag is still true; a NULL expiry is a
    /// perpetual grant.
    pub fn chat_access_active(&self, now: DateTime<Utc>) -> bool {
        self.has_chat_access && self.access_expiry_date.is_none_or(|expiry| expiry > now)
    }
}

/// Public view of another user, as returned by discovery and profile lookups.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicProfile {
    pub id: i64,
    pub display_name: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(has_access: bool, expiry: Option<DateTime<Utc>>) -> User {
        User {
            id: 1,
            email: "a@example.com".into(),
            password_hash: String::new(),
            display_name: "A".into(),
            bio: None,
            gender: None,
            birth_date: None,
            has_chat_access: has_access,
            payment_date: None,
            access_expiry_date: expiry,
            payment_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_flag_means_no_access() {
        let now = Utc::now();
        assert!(!user(false, None).chat_access_active(now));
        assert!(!user(false, Some(now + Duration::days(1))).chat_access_active(now));
    }

    #[test]
    fn perpetual_grant_has_access() {
        assert!(user(true, None).chat_access_active(Utc::now()));
    }

    #[test]
    fn future_expiry_has_access() {
        let now = Utc::now();
        assert!(user(true, Some(now + Duration::hours(1))).chat_access_active(now));
    }

    #[test]
    fn past_expiry_revokes_access() {
        let now = Utc::now();
        assert!(!user(true, Some(now - Duration::seconds(1))).chat_access_active(now));
    }
}
