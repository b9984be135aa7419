use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String, // session id for the server-side store
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        username: String,
        jwt_secret: &str,
        ttl: Duration,
    ) -> Result<(String, Self)> {
        let now = Utc::now();
        let exp = now + ttl;
        let jti = Uuid::new_v4().to_string();

        let claims = Self {
            sub: user_id.to_string(),
            username,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

/// Authenticated request identity. Protected handlers take this as an
/// extractor argument; extraction fails with 401 when the bearer token
/// is missing, invalid, or no longer backed by a live session.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub jti: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let claims = Claims::verify(bearer.token(), &state.config.jwt_secret)?;

        let session = state
            .sessions
            .get(&claims.jti)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

        if session.user_id.to_string() != claims.sub {
            return Err(AppError::Unauthorized("Invalid session".to_string()));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            jti: claims.jti,
        })
    }
}

// Password hashing utilities
pub fn hash_password(password: &str) -> Result<String> {
    let cost = 12;
    bcrypt::hash(password, cost).map_err(AppError::from)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("pw1").unwrap();
        assert_ne!(hash, "pw1");
        assert!(verify_password("pw1", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn claims_round_trip() {
        let user_id = Uuid::new_v4();
        let (token, claims) = Claims::new(
            user_id,
            "alice".to_string(),
            "test-secret",
            Duration::hours(24),
        )
        .unwrap();

        let verified = Claims::verify(&token, "test-secret").unwrap();
        assert_eq!(verified.sub, user_id.to_string());
        assert_eq!(verified.username, "alice");
        assert_eq!(verified.jti, claims.jti);
    }

    #[test]
    fn claims_reject_wrong_secret() {
        let (token, _) = Claims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "test-secret",
            Duration::hours(24),
        )
        .unwrap();

        assert!(Claims::verify(&token, "other-secret").is_err());
    }
}
