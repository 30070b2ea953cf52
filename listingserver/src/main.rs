use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use listingserver::config::Config;
use listingserver::controller::ListingController;
use listingserver::listings::catalog_server::CatalogServer;
use listingserver::service::ListingService;
use listingserver::storage::SqliteStorage;
use shared::{FixedKey, TokenCodec};

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
    let listings = ListingService::new(storage.clone(), storage, codec);

    info!("starting listings server on {}", cfg.addr);

    Server::builder()
        .add_service(CatalogServer::new(ListingController::new(listings)))
        .serve(cfg.addr)
        .await
        .map_err(|e| anyhow::anyhow!("listings server error: {e}"))?;

    Ok(())
}
