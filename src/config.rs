// Runtime configuration from the environment (and an optional .env file)

use anyhow::{Context, Result};
use std::{net::SocketAddr, time::Duration};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_DB_PATH: &str = "finance.db";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Allowed browser origins; a single "*" allows any origin
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            db_path: DEFAULT_DB_PATH.to_string(),
            cors_allow: split_origins(DEFAULT_CORS_ORIGINS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("FT_LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid FT_LISTEN_ADDR")?;
        let db_path = std::env::var("FT_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into());
        let cors_allow = split_origins(
            &std::env::var("FT_CORS_ALLOW_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        );
        let timeout_ms: u64 = match std::env::var("FT_REQUEST_TIMEOUT_MS") {
            Ok(raw) => raw.parse().context("Invalid FT_REQUEST_TIMEOUT_MS")?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow.iter().any(|o| o == "*")
    }
}
