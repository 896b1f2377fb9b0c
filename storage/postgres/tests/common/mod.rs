//! Common utilities for Postgres storage tests

use anyhow::Result;
use boxoffice_core::{CreateTicketOption, PurchaseTicketOption, StorageEngine, TicketOption, TicketOptionId};
use boxoffice_storage_postgres::{Postgres, PostgresConfig};
use std::str::FromStr;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, Postgres)> {
    let container: ContainerAsync<postgres::Postgres> =
        postgres::Postgres::default().with_db_name("boxoffice").with_user("postgres").with_password("postgres").start().await?;

    let config = PostgresConfig {
        host: container.get_host().await?.to_string(),
        port: container.get_host_port_ipv4(5432).await?,
        username: "postgres".into(),
        password: "postgres".into(),
        dbname: "boxoffice".into(),
        max_connections: 10,
    };
    let storage_engine = Postgres::open(&config).await?;

    Ok((container, storage_engine))
}

pub async fn create_option(engine: &Postgres, allocation: i64) -> Result<TicketOption> {
    let input = CreateTicketOption { name: "Concert".into(), description: "Front row".into(), allocation };
    Ok(engine.create_ticket_option(&input).await?)
}

pub fn purchase(id: &TicketOptionId, user_id: &str, quantity: i64) -> PurchaseTicketOption {
    PurchaseTicketOption { ticket_option_id: id.clone(), user_id: user_id.into(), quantity }
}
