//! SSO server configuration.

use anyhow::{anyhow, Result};
use chrono::Duration;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 44044;
const DEFAULT_STORAGE_PATH: &str = "./sso.db";
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub storage_path: String,
    pub token_ttl: Duration,
    pub token_secret: String,
}

impl Config {
    /// Loads configuration from the environment. Only `TOKEN_SECRET` is
    /// required; everything else falls back to a local default.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SSO_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("SSO_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("invalid SSO_PORT '{raw}': {e}"))?,
            Err(_) => DEFAULT_PORT,
        };
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow!("invalid listen address '{host}:{port}': {e}"))?;

        let storage_path =
            std::env::var("STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string());

        let ttl_secs = match std::env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|e| anyhow!("invalid TOKEN_TTL_SECS '{raw}': {e}"))?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };
        if ttl_secs <= 0 {
            return Err(anyhow!("TOKEN_TTL_SECS must be positive, got {ttl_secs}"));
        }

        let token_secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| anyhow!("TOKEN_SECRET environment variable is required"))?;
        if token_secret.is_empty() {
            return Err(anyhow!("TOKEN_SECRET must be non-empty"));
        }

        Ok(Self {
            addr,
            storage_path,
            token_ttl: Duration::seconds(ttl_secs),
            token_secret,
        })
    }
}
