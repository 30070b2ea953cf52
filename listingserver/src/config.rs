//! Listings server configuration.

use anyhow::{anyhow, Result};
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 44045;
const DEFAULT_STORAGE_PATH: &str = "./listings.db";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub storage_path: String,
    pub token_secret: String,
}

impl Config {
    /// Loads configuration from the environment. Only `TOKEN_SECRET` is
    /// required; everything else falls back to a local default.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("LISTINGS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("LISTINGS_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("invalid LISTINGS_PORT '{raw}': {e}"))?,
            Err(_) => DEFAULT_PORT,
        };
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow!("invalid listen address '{host}:{port}': {e}"))?;

        let storage_path =
            std::env::var("STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string());

        let token_secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| anyhow!("TOKEN_SECRET environment variable is required"))?;
        if token_secret.is_empty() {
            return Err(anyhow!("TOKEN_SECRET must be non-empty"));
        }

        Ok(Self {
            addr,
            storage_path,
            token_secret,
        })
    }
}
