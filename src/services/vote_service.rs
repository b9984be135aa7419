use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, Image, VoteDirection},
};

/// Records a vote and adjusts the image's rating in one transaction.
/// The UNIQUE (user_id, image_id) constraint decides the membership
/// check, so two concurrent votes by the same user cannot both land:
/// whichever insert loses the conflict sees zero rows affected and the
/// whole transaction rolls back with no rating change.
pub async fn cast_image_vote(
    db: &PgPool,
    user_id: Uuid,
    image_id: Uuid,
    direction: VoteDirection,
) -> Result<Image> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO image_votes (id, user_id, image_id, direction, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, image_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(image_id)
    .bind(direction.delta() as i16)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound(format!("image {} does not exist", image_id))
        }
        other => AppError::Database(other),
    })?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::AlreadyVoted);
    }

    let image = sqlx::query_as::<_, Image>(
        "UPDATE images SET rating = rating + $1 WHERE id = $2 RETURNING *",
    )
    .bind(direction.delta())
    .bind(image_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("image {} does not exist", image_id)))?;

    tx.commit().await?;

    Ok(image)
}

/// Comment votes go through the same membership-then-adjust protocol
/// as image votes, against the comment_votes table.
pub async fn cast_comment_vote(
    db: &PgPool,
    user_id: Uuid,
    comment_id: Uuid,
    direction: VoteDirection,
) -> Result<Comment> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO comment_votes (id, user_id, comment_id, direction, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, comment_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(comment_id)
    .bind(direction.delta() as i16)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound(format!("comment {} does not exist", comment_id))
        }
        other => AppError::Database(other),
    })?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::AlreadyVoted);
    }

    let comment = sqlx::query_as::<_, Comment>(
        "UPDATE comments SET rating = rating + $1 WHERE id = $2 RETURNING *",
    )
    .bind(direction.delta())
    .bind(comment_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("comment {} does not exist", comment_id)))?;

    tx.commit().await?;

    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(db: &PgPool, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, 'x', NOW())",
        )
        .bind(id)
        .bind(username)
        .execute(db)
        .await
        .unwrap();
        id
    }

    async fn seed_image(db: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO images (id, path, is_featured, rating, published_at) VALUES ($1, $2, false, 0, NOW())",
        )
        .bind(id)
        .bind(format!("{id}.jpg"))
        .execute(db)
        .await
        .unwrap();
        id
    }

    async fn seed_comment(db: &PgPool, author_id: Uuid, image_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO comments (id, text, image_id, author_id, rating, published_at)
            VALUES ($1, 'first!', $2, $3, 0, NOW())
            "#,
        )
        .bind(id)
        .bind(image_id)
        .bind(author_id)
        .execute(db)
        .await
        .unwrap();
        id
    }

    async fn image_rating(db: &PgPool, image_id: Uuid) -> i32 {
        sqlx::query_scalar("SELECT rating FROM images WHERE id = $1")
            .bind(image_id)
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn vote_moves_rating_by_exactly_one(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let image_id = seed_image(&pool).await;

        let image = cast_image_vote(&pool, alice, image_id, VoteDirection::Upvote)
            .await
            .unwrap();
        assert_eq!(image.rating, 1);

        let image = cast_image_vote(&pool, bob, image_id, VoteDirection::Downvote)
            .await
            .unwrap();
        assert_eq!(image.rating, 0);
        assert_eq!(image_rating(&pool, image_id).await, 0);
    }

    #[sqlx::test]
    async fn second_vote_by_same_user_leaves_rating_unchanged(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let image_id = seed_image(&pool).await;

        cast_image_vote(&pool, alice, image_id, VoteDirection::Upvote)
            .await
            .unwrap();

        // Neither direction gets a second chance.
        let err = cast_image_vote(&pool, alice, image_id, VoteDirection::Downvote)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyVoted));
        let err = cast_image_vote(&pool, alice, image_id, VoteDirection::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyVoted));

        assert_eq!(image_rating(&pool, image_id).await, 1);
    }

    #[sqlx::test]
    async fn rating_may_go_negative(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let image_id = seed_image(&pool).await;

        let image = cast_image_vote(&pool, alice, image_id, VoteDirection::Downvote)
            .await
            .unwrap();
        assert_eq!(image.rating, -1);
    }

    #[sqlx::test]
    async fn vote_on_missing_image_is_not_found(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;

        let err = cast_image_vote(&pool, alice, Uuid::new_v4(), VoteDirection::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test]
    async fn comment_votes_follow_the_same_protocol(pool: PgPool) {
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        let image_id = seed_image(&pool).await;
        let comment_id = seed_comment(&pool, alice, image_id).await;

        let comment = cast_comment_vote(&pool, bob, comment_id, VoteDirection::Upvote)
            .await
            .unwrap();
        assert_eq!(comment.rating, 1);

        let err = cast_comment_vote(&pool, bob, comment_id, VoteDirection::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyVoted));

        let rating: i32 = sqlx::query_scalar("SELECT rating FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rating, 1);
    }
}
