use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use shared::{FixedKey, TokenCodec};
use ssoserver::config::Config;
use ssoserver::controller::AuthController;
use ssoserver::service::AuthService;
use ssoserver::sso::auth_server::AuthServer;
use ssoserver::storage::SqliteStorage;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cfg = Config::from_env()?;

    let storage = Arc::new(
        SqliteStorage::connect(&cfg.storage_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open storage: {e}"))?,
    );

    let codec = TokenCodec::new(Arc::new(FixedKey::new(cfg.token_secret.as_bytes().to_vec())));
    let auth = AuthService::new(
        storage.clone(),
        storage.clone(),
        storage,
        codec,
        cfg.token_ttl,
    );

    info!("starting sso server on {}", cfg.addr);

    Server::builder()
        .add_service(AuthServer::new(AuthController::new(auth)))
        .serve(cfg.addr)
        .await
        .map_err(|e| anyhow::anyhow!("sso server error: {e}"))?;

    Ok(())
}
