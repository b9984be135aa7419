use chrono::Duration;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub max_file_size: usize,
    pub allowed_origins: Vec<String>,

    // Session lifetime policy
    pub session_expiry_hours: i64,
    pub session_remember: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            max_file_size: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()
                .unwrap_or(10485760),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            session_expiry_hours: env::var("SESSION_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            session_remember: env::var("SESSION_REMEMBER")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }

    /// Sessions opened with `remember` outlive the base expiry window.
    pub fn session_ttl(&self) -> Duration {
        if self.session_remember {
            Duration::days(30)
        } else {
            Duration::hours(self.session_expiry_hours)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(remember: bool) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            upload_dir: "./uploads".to_string(),
            max_file_size: 1024,
            allowed_origins: vec![],
            session_expiry_hours: 24,
            session_remember: remember,
        }
    }

    #[test]
    fn remember_extends_session_ttl() {
        assert_eq!(config(false).session_ttl(), Duration::hours(24));
        assert_eq!(config(true).session_ttl(), Duration::days(30));
    }
}
