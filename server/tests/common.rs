use std::str::FromStr;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use boxoffice_core::TicketOptionService;
use boxoffice_server::{router, AppState};
use boxoffice_storage_sled::SledStorageEngine;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub fn app() -> anyhow::Result<Router> {
    let storage = SledStorageEngine::new_test()?;
    Ok(router(AppState::new(TicketOptionService::new(Arc::new(storage)))))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request.header("content-type", "application/json").body(Body::from(body.to_string()))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}
