use std::str::FromStr;

use boxoffice_core::{CreateTicketOption, PurchaseTicketOption, StorageEngine, TicketOption, TicketOptionId};
use boxoffice_storage_sled::SledStorageEngine;
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

#[allow(unused)]
pub async fn setup_with_option(allocation: i64) -> Result<(SledStorageEngine, TicketOption), anyhow::Error> {
    let engine = SledStorageEngine::new_test()?;
    let option = engine
        .create_ticket_option(&CreateTicketOption { name: "Concert".to_owned(), description: "Main stage".to_owned(), allocation })
        .await?;
    Ok((engine, option))
}

#[allow(unused)]
pub fn purchase(id: &TicketOptionId, user: &str, quantity: i64) -> PurchaseTicketOption {
    PurchaseTicketOption { ticket_option_id: id.clone(), user_id: user.to_owned(), quantity }
}
