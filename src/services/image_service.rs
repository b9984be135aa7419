use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Image, ImageListItem},
};

pub async fn create_image(
    db: &PgPool,
    path: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Image> {
    let image = sqlx::query_as::<_, Image>(
        r#"
        INSERT INTO images (id, path, title, description, is_featured, rating, published_at)
        VALUES ($1, $2, $3, $4, false, 0, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(path)
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateResource(format!("image path {} already exists", path))
        }
        other => AppError::Database(other),
    })?;

    Ok(image)
}

pub async fn get_image(db: &PgPool, image_id: Uuid) -> Result<Option<Image>> {
    let image = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = $1")
        .bind(image_id)
        .fetch_optional(db)
        .await?;

    Ok(image)
}

/// Lists images with their comment counts, oldest first. With
/// `featured_only` the result is restricted to the trailing 24-hour
/// publication window, evaluated against the clock at query time.
pub async fn list_images(db: &PgPool, featured_only: bool) -> Result<Vec<ImageListItem>> {
    let cutoff: Option<DateTime<Utc>> = featured_only.then(|| featured_cutoff(Utc::now()));

    let images = sqlx::query_as::<_, ImageListItem>(
        r#"
        SELECT i.id, i.path, i.title, i.description, i.is_featured, i.rating, i.published_at,
               COUNT(c.id) AS comments_count
        FROM images i
        LEFT JOIN comments c ON c.image_id = i.id
        WHERE $1::timestamptz IS NULL OR i.published_at > $1
        GROUP BY i.id
        ORDER BY i.published_at ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(db)
    .await?;

    Ok(images)
}

fn featured_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featured_window_is_trailing_24_hours() {
        let now = Utc::now();
        let cutoff = featured_cutoff(now);
        assert_eq!(now - cutoff, Duration::hours(24));
    }
}
