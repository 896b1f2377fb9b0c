use std::path::PathBuf;

use async_trait::async_trait;
use boxoffice_core::{
    error::StorageError, storage::StorageEngine, CreateTicketOption, Fulfillment, Purchase, PurchaseTicketOption, Ticket, TicketOption,
    TicketOptionId,
};
use chrono::Utc;
use sled::{Config, Db};
use tokio::task;
use tracing::debug;

use crate::{
    error::SledError,
    keys,
    record::{PurchaseRecord, TicketOptionRecord, TicketRecord},
};

/// Conditional-write storage engine.
///
/// All records live in one flat tree keyed by partition and sort key (see [`crate::keys`]). The
/// only primitives used are single-key `compare_and_swap` and multi-key `apply_batch`; there is no
/// transaction spanning the allocation decrement and the records written after it.
#[derive(Clone)]
pub struct SledStorageEngine {
    pub db: Db,
    pub(crate) items: sled::Tree,
}

impl SledStorageEngine {
    pub fn with_homedir_folder(folder_name: &str) -> anyhow::Result<Self> {
        let dir = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?.join(folder_name);

        Self::with_path(dir)
    }

    pub fn with_path(path: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&path)?;
        let dbpath = path.join("sled");
        let db = sled::open(&dbpath)?;
        Self::open(db)
    }

    pub fn new() -> anyhow::Result<Self> { Self::with_homedir_folder(".boxoffice") }

    pub fn new_test() -> anyhow::Result<Self> {
        let db = Config::new().temporary(true).flush_every_ms(None).open()?;
        Self::open(db)
    }

    fn open(db: Db) -> anyhow::Result<Self> {
        let items = db.open_tree("items")?;
        Ok(Self { db, items })
    }

    pub(crate) fn create_ticket_option_blocking(&self, input: CreateTicketOption) -> Result<TicketOption, SledError> {
        let id = TicketOptionId::generate();
        let now = Utc::now();
        let record = TicketOptionRecord {
            name: input.name,
            description: input.description,
            allocation: input.allocation,
            created_at: now,
            updated_at: now,
        };

        // insert-if-absent
        let key = keys::ticket_option(&id);
        if self.items.compare_and_swap(&key, None::<&[u8]>, Some(bincode::serialize(&record)?))?.is_err() {
            return Err(SledError::AlreadyExists(id));
        }

        debug!("SledStorageEngine.create_ticket_option: {id}");
        Ok(record.into_ticket_option(id))
    }

    pub(crate) fn get_ticket_option_blocking(&self, id: TicketOptionId) -> Result<TicketOption, SledError> {
        let Some(bytes) = self.items.get(keys::ticket_option(&id))? else { return Err(SledError::NotFound(id)) };
        let record: TicketOptionRecord = bincode::deserialize(&bytes)?;
        Ok(record.into_ticket_option(id))
    }

    /// All purchases recorded under a ticket option's partition.
    pub fn purchases(&self, id: &TicketOptionId) -> Result<Vec<Purchase>, StorageError> {
        let mut purchases = Vec::new();
        for item in self.items.scan_prefix(keys::kind_prefix(id, keys::PURCHASE_PREFIX)) {
            let (_key, value) = item.map_err(SledError::from)?;
            let record: PurchaseRecord = bincode::deserialize(&value).map_err(SledError::from)?;
            purchases.push(record.into_purchase(id.clone()));
        }
        Ok(purchases)
    }

    /// All tickets recorded under a ticket option's partition.
    pub fn tickets(&self, id: &TicketOptionId) -> Result<Vec<Ticket>, StorageError> {
        let mut tickets = Vec::new();
        for item in self.items.scan_prefix(keys::kind_prefix(id, keys::TICKET_PREFIX)) {
            let (_key, value) = item.map_err(SledError::from)?;
            let record: TicketRecord = bincode::deserialize(&value).map_err(SledError::from)?;
            tickets.push(record.into_ticket(id.clone()));
        }
        Ok(tickets)
    }
}

#[async_trait]
impl StorageEngine for SledStorageEngine {
    // sled is blocking; every call hops onto the blocking pool and delegates to its *_blocking counterpart
    async fn create_ticket_option(&self, input: &CreateTicketOption) -> Result<TicketOption, StorageError> {
        let me = self.clone();
        let input = input.clone();
        Ok(task::spawn_blocking(move || me.create_ticket_option_blocking(input)).await.map_err(SledError::from)??)
    }

    async fn get_ticket_option(&self, id: &TicketOptionId) -> Result<TicketOption, StorageError> {
        let me = self.clone();
        let id = id.clone();
        Ok(task::spawn_blocking(move || me.get_ticket_option_blocking(id)).await.map_err(SledError::from)??)
    }

    /// Dropping this future does not stop the blocking sequence; it runs to completion (including
    /// any compensation) on the blocking pool.
    async fn generate_tickets(&self, input: &PurchaseTicketOption) -> Result<Fulfillment, StorageError> {
        let me = self.clone();
        let input = input.clone();
        task::spawn_blocking(move || me.generate_tickets_blocking(input)).await.map_err(SledError::from)?
    }

    async fn close(&self) -> Result<(), StorageError> {
        let flushed = self.db.flush_async().await.map_err(SledError::from)?;
        debug!("SledStorageEngine.close: flushed {flushed} bytes");
        Ok(())
    }
}
