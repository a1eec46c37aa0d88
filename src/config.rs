use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime from login.
    pub max_age_hours: i64,
    /// Inactivity window since the last validated request.
    pub idle_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    pub max_attempts: u32,
    pub lock_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub admin: AdminCredentials,
    pub session: SessionConfig,
    pub lockout: LockoutConfig,
    /// Cosmetic delay before answering a login, kept from the original UI.
    pub login_delay_ms: u64,
    /// When unset the store lives in memory only.
    pub data_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let admin = AdminCredentials {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123456".into()),
        };
        let session = SessionConfig {
            max_age_hours: env_i64("SESSION_MAX_AGE_HOURS", 24),
            idle_minutes: env_i64("SESSION_IDLE_MINUTES", 30),
        };
        let lockout = LockoutConfig {
            max_attempts: env_i64("LOCKOUT_MAX_ATTEMPTS", 5) as u32,
            lock_minutes: env_i64("LOCKOUT_MINUTES", 15),
        };
        let login_delay_ms = env_i64("LOGIN_DELAY_MS", 500) as u64;
        let data_file = std::env::var("DATA_FILE").ok().map(PathBuf::from);

        Ok(Self {
            admin,
            session,
            lockout,
            login_delay_ms,
            data_file,
        })
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
