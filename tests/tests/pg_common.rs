#![cfg(feature = "postgres")]

use anyhow::Result;
use boxoffice_storage_postgres::{Postgres, PostgresConfig};
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};

pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, Postgres)> {
    let container: ContainerAsync<postgres::Postgres> = postgres::Postgres::default()
        .with_db_name("boxoffice")
        .with_user("postgres")
        .with_password("postgres")
        // if you want to inspect the container
        // .with_container_name("boxoffice_pg")
        // .with_reuse(testcontainers::ReuseDirective::Always)
        .start()
        .await?;

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
