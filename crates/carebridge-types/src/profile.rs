use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points awarded for each successfully posted listing.
pub const POINTS_PER_SUBMISSION: i64 = 5;

/// An authenticated user as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub display_name: String,
}

impl Identity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
        }
    }
}

/// Per-user reputation record. `points` is the reputation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub points: i64,
    /// Leaderboard position as of the last recompute.
    pub rank: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            display_name: identity.display_name.clone(),
            points: 0,
            rank: None,
            created_at: Utc::now(),
        }
    }
}
