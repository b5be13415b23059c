//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables so the same
//! binary runs unchanged across local, staging and production.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default lifetime of a team invitation
pub const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// JWT validation
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Version reported to clients, and the oldest client build still served
    pub app_version: String,
    pub min_supported_version: Option<String>,

    /// Days before a pending invitation expires
    pub invitation_ttl_days: i64,

    /// Apply pending migrations at startup
    pub run_migrations: bool,

    /// Runtime configuration
    pub rust_log: String,
    pub log_format: LogFormat,
    pub port: u16,
}

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            jwt_audience: env::var("JWT_AUDIENCE").ok(),

            app_version: env::var("APP_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            min_supported_version: env::var("MIN_SUPPORTED_VERSION").ok(),

            invitation_ttl_days: parse_or(
                env::var("INVITATION_TTL_DAYS").ok(),
                DEFAULT_INVITATION_TTL_DAYS,
            ),

            run_migrations: parse_or(env::var("RUN_MIGRATIONS").ok(), false),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "propdesk=debug".to_string()),
            log_format: LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default()),
            port: parse_or(env::var("PORT").ok(), 3000),
        };

        if config.invitation_ttl_days <= 0 {
            anyhow::bail!("INVITATION_TTL_DAYS must be positive");
        }

        Ok(config)
    }
}

/// Parse an optional raw value, falling back to `default` when absent or malformed
fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
