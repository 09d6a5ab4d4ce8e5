use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// How long a successful submission waits before redirecting.
    pub submit_confirmation_delay: Duration,
    pub max_concurrent_requests: usize,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000)?;
        let jwt_ttl_hours = parse_or("JWT_TTL_HOURS", 24)?;
        let delay_ms = parse_or("SUBMIT_CONFIRMATION_DELAY_MS", 0)?;
        let max_concurrent_requests = parse_or("MAX_CONCURRENT_REQUESTS", 100)?;
        let max_body_bytes = parse_or("MAX_BODY_BYTES", 1024 * 1024)?;
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            submit_confirmation_delay: Duration::from_millis(delay_ms),
            max_concurrent_requests,
            max_body_bytes,
        })
    }

    /// Settings for tests and local tooling that never touch the network.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_hours: 1,
            submit_confirmation_delay: Duration::ZERO,
            max_concurrent_requests: 100,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Reads `key`, using `default` only when the variable is unset or empty.
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, env::var(key).ok().as_deref(), default)
}

fn parse_value<T>(key: &str, raw: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value `{value}`")),
    }
}
