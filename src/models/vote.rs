use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vote direction, parsed strictly from the form's `is_upvote` boolean.
/// Malformed input fails form deserialization instead of defaulting to
/// a downvote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    pub fn delta(self) -> i32 {
        match self {
            VoteDirection::Upvote => 1,
            VoteDirection::Downvote => -1,
        }
    }
}

impl From<bool> for VoteDirection {
    fn from(is_upvote: bool) -> Self {
        if is_upvote {
            VoteDirection::Upvote
        } else {
            VoteDirection::Downvote
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageVote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_id: Uuid,
    pub direction: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentVote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub comment_id: Uuid,
    pub direction: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ImageVoteForm {
    pub image_id: Uuid,
    pub is_upvote: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommentVoteForm {
    pub comment_id: Uuid,
    pub is_upvote: bool,
}
