//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Minimum accepted length of the JWT signing secret, in bytes.
const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: String,

    /// Lifetime of issued bearer tokens (default: 24 hours).
    pub token_lifetime: Duration,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Mutating editable-content calls allowed per identity per window (default: 30).
    pub rate_limit_max_requests: u32,

    /// Rate limit window (default: 60 seconds).
    pub rate_limit_window: Duration,

    /// How often expired rate-limit windows are swept (default: 300 seconds).
    pub rate_limit_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
        }

        let token_lifetime = env::var("TOKEN_LIFETIME_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("TOKEN_LIFETIME_SECS must be a valid u64")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("RATE_LIMIT_MAX_REQUESTS must be a valid u32")?;

        let rate_limit_window = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("RATE_LIMIT_WINDOW_SECS must be a valid u64")?;

        let rate_limit_sweep_interval = env::var("RATE_LIMIT_SWEEP_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("RATE_LIMIT_SWEEP_SECS must be a valid u64")?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            token_lifetime,
            cors_allowed_origins,
            rate_limit_max_requests,
            rate_limit_window,
            rate_limit_sweep_interval,
        })
    }
}
