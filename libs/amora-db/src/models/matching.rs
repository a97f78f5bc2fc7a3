use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Like,
    Pass,
}

impl SwipeDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(Self::Like),
            "pass" => Some(Self::Pass),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pass => "pass",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Swipe {
    pub id: i64,
    pub swiper_id: i64,
    pub swiped_id: i64,
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

/// A mutual like. The pair is stored ordered (user_a < user_b) so the unique
/// constraint catches both swipe orders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: i64) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    pub fn peer_of(&self, user_id: i64) -> i64 {
        if self.user_a == user_id { self.user_b } else { self.user_a }
    }
}

pub fn ordered_pair(a: i64, b: i64) -> (i64, i64) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_ordered() {
        assert_eq!(ordered_pair(7, 3), (3, 7));
        assert_eq!(ordered_pair(3, 7), (3, 7));
    }

    #[test]
    fn peer_resolution() {
        let m = Match { id: 1, user_a: 3, user_b: 7, created_at: Utc::now() };
        assert_eq!(m.peer_of(3), 7);
        assert_eq!(m.peer_of(7), 3);
        assert!(m.involves(3));
        assert!(!m.involves(4));
    }
}
