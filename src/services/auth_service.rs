use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{Claims, hash_password, verify_password},
    config::Config,
    error::{AppError, Result},
    models::User,
    session::SessionStore,
};

/// Creates the user and opens a session for it: signup implies login.
pub async fn register(
    db: &PgPool,
    sessions: &SessionStore,
    config: &Config,
    username: &str,
    password: &str,
) -> Result<(String, User)> {
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateIdentity);
    }

    let password_hash = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(&password_hash)
    .bind(chrono::Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| match e {
        // Two concurrent signups can both pass the pre-check; the
        // unique constraint settles the race.
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateIdentity
        }
        other => AppError::Database(other),
    })?;

    let token = open_session(sessions, config, &user).await?;

    Ok((token, user))
}

pub async fn authenticate(
    db: &PgPool,
    sessions: &SessionStore,
    config: &Config,
    username: &str,
    password: &str,
) -> Result<(String, User)> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = open_session(sessions, config, &user).await?;

    Ok((token, user))
}

pub async fn logout(sessions: &SessionStore, token_jti: &str) -> Result<()> {
    sessions.delete(token_jti).await
}

async fn open_session(sessions: &SessionStore, config: &Config, user: &User) -> Result<String> {
    let ttl = config.session_ttl();
    let (token, claims) = Claims::new(user.id, user.username.clone(), &config.jwt_secret, ttl)?;
    sessions.create(user.id, &claims.jti, ttl).await?;

    Ok(token)
}
