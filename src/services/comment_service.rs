use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CommentResponse, CommentWithAuthorRow, User, UserResponse},
};

/// Creates a comment against an existing image. A dangling `image_id`
/// is a referential-integrity failure and leaves no row behind.
pub async fn create_comment(
    db: &PgPool,
    text: &str,
    author_id: Uuid,
    image_id: Uuid,
) -> Result<CommentResponse> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, text, image_id, author_id, rating, published_at)
        VALUES ($1, $2, $3, $4, 0, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(text)
    .bind(image_id)
    .bind(author_id)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            match db_err.constraint() {
                Some("comments_author_id_fkey") => AppError::ReferentialIntegrity(format!(
                    "user {} does not exist",
                    author_id
                )),
                _ => AppError::ReferentialIntegrity(format!("image {} does not exist", image_id)),
            }
        }
        other => AppError::Database(other),
    })?;

    let author = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(author_id)
        .fetch_one(db)
        .await?;

    Ok(CommentResponse::new(comment, UserResponse::from(author)))
}

/// Comments for one image with their authors, oldest first.
pub async fn list_comments(db: &PgPool, image_id: Uuid) -> Result<Vec<CommentResponse>> {
    let rows = sqlx::query_as::<_, CommentWithAuthorRow>(
        r#"
        SELECT c.id, c.text, c.image_id, c.rating, c.published_at,
               u.id AS author_id, u.username AS author_username,
               u.created_at AS author_created_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.image_id = $1
        ORDER BY c.published_at ASC
        "#,
    )
    .bind(image_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(CommentResponse::from).collect())
}
