//! Transactional storage engine backed by Postgres.
//!
//! The allocation decrement, the purchase row and the ticket rows of one fulfillment are written
//! inside a single transaction. A `CHECK (allocation >= 0)` constraint is what rejects an
//! over-allocation: when it fires, the transaction is rolled back and nothing is left behind.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bb8_postgres::{tokio_postgres::NoTls, PostgresConnectionManager};
use boxoffice_core::{
    error::StorageError, storage::StorageEngine, CreateTicketOption, Fulfillment, Purchase, PurchaseTicketOption, Ticket, TicketId,
    TicketOption, TicketOptionId,
};
use serde::Deserialize;
use tokio_postgres::{Row, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod error;
pub mod schema;

pub use error::{error_kind, ErrorKind, PostgresError};

pub type Pool = bb8::Pool<PostgresConnectionManager<NoTls>>;

/// Connection settings for [`Postgres::open`].
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_port() -> u16 { 5432 }

fn default_max_connections() -> u32 { 10 }

impl PostgresConfig {
    fn connection_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config.host(&self.host).port(self.port).user(&self.username).password(&self.password).dbname(&self.dbname);
        config
    }
}

pub struct Postgres {
    // taken out by `close`, which drops the pool once in-flight operations finish
    pool: RwLock<Option<Pool>>,
}

impl Postgres {
    pub fn new(pool: Pool) -> Self { Self { pool: RwLock::new(Some(pool)) } }

    /// Build a connection pool from `config` and make sure the schema exists.
    pub async fn open(config: &PostgresConfig) -> Result<Self, PostgresError> {
        let manager = PostgresConnectionManager::new(config.connection_config(), NoTls);
        let pool = bb8::Pool::builder().max_size(config.max_connections).build(manager).await?;
        info!("Postgres.open: {}:{}/{} (max {} connections)", config.host, config.port, config.dbname, config.max_connections);

        let engine = Self::new(pool);
        engine.ensure_schema().await?;
        Ok(engine)
    }

    /// Create the extension, tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), PostgresError> {
        let pool = self.pool()?;
        let client = pool.get().await?;
        client.batch_execute(schema::CREATE_SCHEMA).await?;
        debug!("Postgres.ensure_schema: done");
        Ok(())
    }

    /// The connection pool, or [`PostgresError::Closed`] once [`StorageEngine::close`] has run.
    pub fn pool(&self) -> Result<Pool, PostgresError> {
        self.pool.read().unwrap_or_else(PoisonError::into_inner).clone().ok_or(PostgresError::Closed)
    }

    /// All purchases recorded against a ticket option, oldest first.
    pub async fn purchases(&self, id: &TicketOptionId) -> Result<Vec<Purchase>, StorageError> {
        let Some(uuid) = parse_id(id) else { return Ok(Vec::new()) };
        let pool = self.pool()?;
        let client = pool.get().await.map_err(PostgresError::from)?;
        let rows = client.query(schema::SELECT_PURCHASES, &[&uuid]).await.map_err(PostgresError::from)?;
        rows.iter().map(purchase_from_row).collect()
    }

    /// All tickets recorded against a ticket option, oldest first.
    pub async fn tickets(&self, id: &TicketOptionId) -> Result<Vec<Ticket>, StorageError> {
        let Some(uuid) = parse_id(id) else { return Ok(Vec::new()) };
        let pool = self.pool()?;
        let client = pool.get().await.map_err(PostgresError::from)?;
        let rows = client.query(schema::SELECT_TICKETS, &[&uuid]).await.map_err(PostgresError::from)?;
        rows.iter().map(ticket_from_row).collect()
    }
}

#[async_trait]
impl StorageEngine for Postgres {
    async fn create_ticket_option(&self, input: &CreateTicketOption) -> Result<TicketOption, StorageError> {
        let pool = self.pool()?;
        let client = pool.get().await.map_err(PostgresError::from)?;
        let row = client
            .query_one(schema::INSERT_TICKET_OPTION, &[&input.name, &input.description, &input.allocation])
            .await
            .map_err(PostgresError::from)?;
        let option = ticket_option_from_row(&row)?;
        debug!("Postgres.create_ticket_option: {}", option.id);
        Ok(option)
    }

    async fn get_ticket_option(&self, id: &TicketOptionId) -> Result<TicketOption, StorageError> {
        // every id this engine hands out is a uuid; anything else cannot exist
        let Some(uuid) = parse_id(id) else { return Err(StorageError::NotFound(id.clone())) };
        let pool = self.pool()?;
        let client = pool.get().await.map_err(PostgresError::from)?;
        match client.query_opt(schema::SELECT_TICKET_OPTION, &[&uuid]).await.map_err(PostgresError::from)? {
            Some(row) => ticket_option_from_row(&row),
            None => Err(StorageError::NotFound(id.clone())),
        }
    }

    /// Dropping this future before it commits rolls the transaction back.
    async fn generate_tickets(&self, input: &PurchaseTicketOption) -> Result<Fulfillment, StorageError> {
        let Some(option_id) = parse_id(&input.ticket_option_id) else { return Err(StorageError::NotFound(input.ticket_option_id.clone())) };

        let pool = self.pool()?;
        let mut client = pool.get().await.map_err(PostgresError::from)?;
        let trx = client.transaction().await.map_err(PostgresError::from)?;

        match fulfill(&trx, option_id, input).await {
            Ok(fulfillment) => {
                trx.commit().await.map_err(PostgresError::from)?;
                debug!("Postgres.generate_tickets: committed purchase {} ({} tickets)", fulfillment.purchase_id, fulfillment.ticket_ids.len());
                Ok(fulfillment)
            }
            Err(err) => {
                if let Err(rollback_err) = trx.rollback().await {
                    warn!("Postgres.generate_tickets: rollback failed for {}: {rollback_err}", input.ticket_option_id);
                }
                Err(err)
            }
        }
    }

    /// Stop handing out connections. Idle connections are closed when the pool drops, which
    /// happens as soon as no operation still holds a clone of it.
    async fn close(&self) -> Result<(), StorageError> {
        let pool = self.pool.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(pool) = pool {
            let state = pool.state();
            info!("Postgres.close: releasing {} connections ({} idle)", state.connections, state.idle_connections);
        }
        Ok(())
    }
}

async fn fulfill(trx: &Transaction<'_>, option_id: Uuid, input: &PurchaseTicketOption) -> Result<Fulfillment, StorageError> {
    let updated = match trx.execute(schema::DECREMENT_ALLOCATION, &[&input.quantity, &option_id]).await {
        Ok(updated) => updated,
        Err(err) => match error_kind(&err) {
            ErrorKind::CheckViolation { constraint: Some(constraint) } if constraint == schema::ALLOCATION_CHECK => {
                debug!("Postgres.generate_tickets: allocation check failed for {} (requested {})", input.ticket_option_id, input.quantity);
                return Err(StorageError::AllocationExhausted { ticket_option_id: input.ticket_option_id.clone(), requested: input.quantity });
            }
            _ => return Err(PostgresError::from(err).into()),
        },
    };
    if updated == 0 {
        return Err(StorageError::NotFound(input.ticket_option_id.clone()));
    }

    let row = trx.query_one(schema::INSERT_PURCHASE, &[&option_id, &input.user_id, &input.quantity]).await.map_err(PostgresError::from)?;
    let purchase_id: Uuid = row.try_get("id").map_err(PostgresError::from)?;

    let rows = trx.query(schema::INSERT_TICKETS, &[&option_id, &purchase_id, &input.quantity]).await.map_err(PostgresError::from)?;
    let ticket_ids = rows
        .iter()
        .map(|row| row.try_get::<_, Uuid>("id").map(TicketId::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(PostgresError::from)?;

    Ok(Fulfillment { purchase_id: purchase_id.into(), ticket_ids })
}

fn parse_id(id: &TicketOptionId) -> Option<Uuid> { Uuid::parse_str(id.as_str()).ok() }

fn ticket_option_from_row(row: &Row) -> Result<TicketOption, StorageError> {
    Ok(TicketOption {
        id: row.try_get::<_, Uuid>("id").map_err(PostgresError::from)?.into(),
        name: row.try_get("name").map_err(PostgresError::from)?,
        description: row.try_get("description").map_err(PostgresError::from)?,
        allocation: row.try_get("allocation").map_err(PostgresError::from)?,
        created_at: row.try_get("created_at").map_err(PostgresError::from)?,
        updated_at: row.try_get("updated_at").map_err(PostgresError::from)?,
    })
}

fn purchase_from_row(row: &Row) -> Result<Purchase, StorageError> {
    Ok(Purchase {
        id: row.try_get::<_, Uuid>("id").map_err(PostgresError::from)?.into(),
        ticket_option_id: row.try_get::<_, Uuid>("ticket_option_id").map_err(PostgresError::from)?.into(),
        user_id: row.try_get("user_id").map_err(PostgresError::from)?,
        quantity: row.try_get("quantity").map_err(PostgresError::from)?,
        created_at: row.try_get("created_at").map_err(PostgresError::from)?,
        updated_at: row.try_get("updated_at").map_err(PostgresError::from)?,
    })
}

fn ticket_from_row(row: &Row) -> Result<Ticket, StorageError> {
    Ok(Ticket {
        id: row.try_get::<_, Uuid>("id").map_err(PostgresError::from)?.into(),
        purchase_id: row.try_get::<_, Uuid>("purchase_id").map_err(PostgresError::from)?.into(),
        ticket_option_id: row.try_get::<_, Uuid>("ticket_option_id").map_err(PostgresError::from)?.into(),
        created_at: row.try_get("created_at").map_err(PostgresError::from)?,
        updated_at: row.try_get("updated_at").map_err(PostgresError::from)?,
    })
}
