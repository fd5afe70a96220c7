use std::str::FromStr;

use anyhow::{Context, Result};

pub const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_hours: i64,
    pub seed_catalog: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: text("LIFTLOG_HOST", "0.0.0.0"),
            port: parsed(&lookup, "LIFTLOG_PORT", 8000)?,
            db_path: text("LIFTLOG_DB_PATH", "liftlog.db"),
            jwt_secret: text("LIFTLOG_JWT_SECRET", DEV_SECRET),
            access_token_minutes: parsed(&lookup, "LIFTLOG_ACCESS_TOKEN_MINUTES", 5)?,
            refresh_token_hours: parsed(&lookup, "LIFTLOG_REFRESH_TOKEN_HOURS", 24)?,
            seed_catalog: parsed(&lookup, "LIFTLOG_SEED_CATALOG", true)?,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_SECRET
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
