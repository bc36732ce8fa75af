// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Leaderboard size used when the caller does not pass `topN`.
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound accepted for `topN` on leaderboard queries.
pub const MAX_TOP_N: usize = 100;

/// Cap on rows returned by the plain result listing.
pub const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            cors_origins,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
