use anyhow::Result;
use boxoffice_server::{Config, Server, StorageConfig};
use boxoffice_storage_postgres::Postgres;
use boxoffice_storage_sled::SledStorageEngine;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // initialize tracing
    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    let builder = Server::builder().bind_address(config.bind_address.clone());

    // Initialize storage engine
    let builder = match &config.storage {
        StorageConfig::Sled { path: Some(path) } => {
            info!("using sled storage at {}", path.display());
            builder.with_storage(SledStorageEngine::with_path(path.clone())?)
        }
        StorageConfig::Sled { path: None } => {
            info!("using sled storage in the home directory");
            builder.with_storage(SledStorageEngine::new()?)
        }
        StorageConfig::Postgres(pg) => builder.with_storage(Postgres::open(pg).await?),
    };

    let builder = match config.operation_timeout {
        Some(timeout) => builder.operation_timeout(timeout),
        None => builder,
    };

    builder.build()?.run().await
}
