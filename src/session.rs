use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

/// Server-side session records backing the bearer tokens. A token is
/// only accepted while its `jti` still resolves to an unexpired row
/// here, so logout takes effect immediately regardless of the token's
/// own expiry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_jti: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    db: PgPool,
}

impl SessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, token_jti: &str, ttl: Duration) -> Result<Session> {
        // Sweep dead rows while we are here; there is no background job
        // to do it.
        self.purge_expired().await?;

        let now = Utc::now();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token_jti, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_jti)
        .bind(now + ttl)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    pub async fn get(&self, token_jti: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token_jti = $1 AND expires_at > NOW()",
        )
        .bind(token_jti)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    pub async fn delete(&self, token_jti: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_jti = $1")
            .bind(token_jti)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Deletes rows past `expires_at`; run opportunistically whenever a
    /// new session is opened.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
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

    #[sqlx::test]
    async fn expired_sessions_are_swept_on_create(pool: PgPool) {
        let store = SessionStore::new(pool.clone());
        let user_id = seed_user(&pool, "alice").await;

        store
            .create(user_id, "stale-jti", Duration::hours(-1))
            .await
            .unwrap();
        store
            .create(user_id, "fresh-jti", Duration::hours(1))
            .await
            .unwrap();

        assert!(store.get("stale-jti").await.unwrap().is_none());
        assert!(store.get("fresh-jti").await.unwrap().is_some());

        let stale_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token_jti = 'stale-jti'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stale_rows, 0);
    }

    #[sqlx::test]
    async fn deleted_session_no_longer_resolves(pool: PgPool) {
        let store = SessionStore::new(pool.clone());
        let user_id = seed_user(&pool, "bob").await;

        store
            .create(user_id, "live-jti", Duration::hours(1))
            .await
            .unwrap();
        assert!(store.get("live-jti").await.unwrap().is_some());

        store.delete("live-jti").await.unwrap();
        assert!(store.get("live-jti").await.unwrap().is_none());
    }
}
