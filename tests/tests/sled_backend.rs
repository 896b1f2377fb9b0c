mod common;

use anyhow::Result;
use boxoffice_storage_sled::SledStorageEngine;
use common::*;

#[tokio::test]
async fn test_concert_scenario() -> Result<()> { concert_scenario(&service(SledStorageEngine::new_test()?)).await }

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_purchases() -> Result<()> {
    let service = service(SledStorageEngine::new_test()?);
    concurrent_single_purchases(&service, 25, 100).await?;
    // more capacity than demand
    concurrent_single_purchases(&service, 50, 20).await
}

#[tokio::test]
async fn test_repeated_purchase() -> Result<()> { repeated_purchase_is_not_idempotent(&service(SledStorageEngine::new_test()?)).await }

#[tokio::test]
async fn test_unknown_option() -> Result<()> { unknown_option_is_not_found(&service(SledStorageEngine::new_test()?)).await }
