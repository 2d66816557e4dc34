use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// One year.
const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Validity window of issued session tokens.
    pub jwt_ttl_minutes: i64,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let port: u16 = parse_or("PORT", 3001);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let jwt_ttl_minutes = check_ttl(parse_or("JWT_TTL_MINUTES", 60))
            .context("JWT_TTL_MINUTES is out of range")?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            addr,
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),
            jwt_secret,
            jwt_ttl_minutes,
            cors_origins,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {key} value {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

fn check_ttl(minutes: i64) -> Result<i64> {
    anyhow::ensure!(
        (1..=MAX_JWT_TTL_MINUTES).contains(&minutes),
        "session lifetime must be between 1 and {MAX_JWT_TTL_MINUTES} minutes, got {minutes}"
    );
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        assert_eq!(check_ttl(60).unwrap(), 60);
        assert_eq!(check_ttl(MAX_JWT_TTL_MINUTES).unwrap(), MAX_JWT_TTL_MINUTES);
        assert!(check_ttl(0).is_err());
        assert!(check_ttl(-5).is_err());
        assert!(check_ttl(i64::MAX).is_err());
    }
}
