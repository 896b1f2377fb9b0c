//! Error taxonomy.
//!
//! [`StorageError`] is what a storage engine returns; each engine translates its own driver errors
//! into it at the boundary. [`ServiceError`] is the domain taxonomy handed to callers of
//! [`crate::service::TicketOptionService`]; no `StorageError` variant escapes the service.

use thiserror::Error;

use crate::id::TicketOptionId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ticket option not found: {0}")]
    NotFound(TicketOptionId),

    /// The conditional decrement was rejected because it would drive the allocation below zero.
    #[error("allocation check failed for ticket option {ticket_option_id} (requested {requested})")]
    AllocationExhausted { ticket_option_id: TicketOptionId, requested: i64 },

    /// The allocation was decremented but writing the purchase or its tickets failed afterwards.
    /// Only engines without cross-record atomicity can produce this. `compensated` tells whether
    /// the decrement was handed back; when it is `false` the decrement is orphaned.
    #[error("partial fulfillment for ticket option {ticket_option_id} (quantity {quantity}, compensated: {compensated}): {source}")]
    PartialFulfillment {
        ticket_option_id: TicketOptionId,
        quantity: i64,
        compensated: bool,
        #[source]
        source: BoxError,
    },

    #[error("serialization error: {0}")]
    Serialization(BoxError),

    #[error("backend error: {0}")]
    Backend(BoxError),
}

impl StorageError {
    pub fn backend(err: impl Into<BoxError>) -> Self { StorageError::Backend(err.into()) }

    pub fn serialization(err: impl Into<BoxError>) -> Self { StorageError::Serialization(err.into()) }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before reaching storage.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("ticket option not found: {0}")]
    NotFound(TicketOptionId),

    #[error("no more ticket allocation available (requested {requested})")]
    OverAllocated { requested: i64 },

    /// Storage reported success but handed back fewer ticket ids than were purchased.
    #[error("not enough tickets generated: requested {requested}, generated {generated}")]
    InsufficientTicketsGenerated { requested: i64, generated: usize },

    #[error("internal error: {0}")]
    Internal(BoxError),
}

impl ServiceError {
    pub fn internal(err: impl Into<BoxError>) -> Self { ServiceError::Internal(err.into()) }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => ServiceError::NotFound(id),
            StorageError::AllocationExhausted { requested, .. } => ServiceError::OverAllocated { requested },
            other => ServiceError::Internal(Box::new(other)),
        }
    }
}
