use std::{sync::Arc, time::Duration};

use anyhow::Result;
use boxoffice_core::{StorageEngine, TicketOptionService};
use tracing::{info, warn};

use crate::{routes::router, state::AppState};

pub struct Server {
    bind_address: String,
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder { ServerBuilder::default() }

    pub fn state(&self) -> &AppState { &self.state }

    /// Serve until ctrl-c, then drain in-flight requests and close the storage engine.
    pub async fn run(self) -> Result<()> {
        let app = router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        info!("shutting down");
        self.state.service().close().await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // without a signal handler the only way out is killing the process
        warn!("failed to install ctrl-c handler: {err}");
        std::future::pending::<()>().await;
    }
}

#[derive(Default)]
pub struct ServerBuilder {
    bind_address: Option<String>,
    storage: Option<Arc<dyn StorageEngine>>,
    operation_timeout: Option<Duration>,
}

impl ServerBuilder {
    pub fn bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = Some(addr.into());
        self
    }

    pub fn with_storage(mut self, storage: impl StorageEngine + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Upper bound on a single service operation; an operation that exceeds it fails as an
    /// internal error.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Server> {
        let bind_address = self.bind_address.ok_or_else(|| anyhow::anyhow!("bind_address is required"))?;

        let storage = self.storage.ok_or_else(|| anyhow::anyhow!("storage is required"))?;

        let service = TicketOptionService::new(storage);
        let service = match self.operation_timeout {
            Some(timeout) => service.with_timeout(timeout),
            None => service,
        };

        Ok(Server { bind_address, state: AppState::new(service) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_storage_sled::SledStorageEngine;

    #[test]
    fn build_requires_bind_address_and_storage() {
        let err = Server::builder().with_storage(SledStorageEngine::new_test().unwrap()).build().err().unwrap();
        assert_eq!(err.to_string(), "bind_address is required");

        let err = Server::builder().bind_address("127.0.0.1:0").build().err().unwrap();
        assert_eq!(err.to_string(), "storage is required");

        assert!(Server::builder()
            .bind_address("127.0.0.1:0")
            .with_storage(SledStorageEngine::new_test().unwrap())
            .operation_timeout(Duration::from_secs(1))
            .build()
            .is_ok());
    }
}
