use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::UserResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub image_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommentForm {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
    pub image_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub text: String,
    pub image_id: Uuid,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
    pub author: UserResponse,
}

impl CommentResponse {
    pub fn new(comment: Comment, author: UserResponse) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            image_id: comment.image_id,
            rating: comment.rating,
            published_at: comment.published_at,
            author,
        }
    }
}

/// Flat view returned by the comment vote route, where no author
/// object is embedded.
#[derive(Debug, Serialize)]
pub struct CommentSummary {
    pub id: Uuid,
    pub text: String,
    pub image_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
}

impl From<Comment> for CommentSummary {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            image_id: comment.image_id,
            author_id: comment.author_id,
            rating: comment.rating,
            published_at: comment.published_at,
        }
    }
}

/// Flat row shape for the comment listing join against `users`.
#[derive(Debug, FromRow)]
pub struct CommentWithAuthorRow {
    pub id: Uuid,
    pub text: String,
    pub image_id: Uuid,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_created_at: DateTime<Utc>,
}

impl From<CommentWithAuthorRow> for CommentResponse {
    fn from(row: CommentWithAuthorRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            image_id: row.image_id,
            rating: row.rating,
            published_at: row.published_at,
            author: UserResponse {
                id: row.author_id,
                username: row.author_username,
                created_at: row.author_created_at,
            },
        }
    }
}
