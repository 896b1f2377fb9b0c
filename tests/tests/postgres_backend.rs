#![cfg(feature = "postgres")]
mod common;
mod pg_common;

use anyhow::Result;
use common::*;

#[tokio::test]
async fn test_concert_scenario() -> Result<()> {
    let (_container, storage_engine) = pg_common::create_postgres_container().await?;
    concert_scenario(&service(storage_engine)).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_purchases() -> Result<()> {
    let (_container, storage_engine) = pg_common::create_postgres_container().await?;
    let service = service(storage_engine);
    concurrent_single_purchases(&service, 25, 100).await?;
    concurrent_single_purchases(&service, 50, 20).await
}

#[tokio::test]
async fn test_repeated_purchase() -> Result<()> {
    let (_container, storage_engine) = pg_common::create_postgres_container().await?;
    repeated_purchase_is_not_idempotent(&service(storage_engine)).await
}

#[tokio::test]
async fn test_unknown_option() -> Result<()> {
    let (_container, storage_engine) = pg_common::create_postgres_container().await?;
    unknown_option_is_not_found(&service(storage_engine)).await
}
