use anyhow::Result;
use chrono::Duration;
use std::env;
use crate::constants::{DEFAULT_SERVER_PORT, DEFAULT_SESSION_TTL_HOURS};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub session_ttl_hours: i64,
    /// Empty means any origin is allowed
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| anyhow::anyhow!("SESSION_TTL_HOURS must be a positive integer, got '{}'", raw))?,
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            session_ttl_hours,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" https://a.dev, ,https://b.dev "),
            vec!["https://a.dev".to_string(), "https://b.dev".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn default_ttl_is_one_week() {
        assert_eq!(Config::default().session_ttl(), Duration::days(7));
    }
}
