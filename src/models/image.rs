use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: Uuid,
    /// Generated storage filename; the only name ever exposed publicly.
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_featured: bool,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_featured: bool,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            path: image.path,
            title: image.title,
            description: image.description,
            is_featured: image.is_featured,
            rating: image.rating,
            published_at: image.published_at,
        }
    }
}

/// Listing row: an image plus its comment count.
#[derive(Debug, Serialize, FromRow)]
pub struct ImageListItem {
    pub id: Uuid,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_featured: bool,
    pub rating: i32,
    pub published_at: DateTime<Utc>,
    pub comments_count: i64,
}
