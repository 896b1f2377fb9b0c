use boxoffice_core::{error::StorageError, TicketOptionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SledError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("ticket option not found: {0}")]
    NotFound(TicketOptionId),
    #[error("allocation of {ticket_option_id} cannot cover {requested}")]
    AllocationExhausted { ticket_option_id: TicketOptionId, requested: i64 },
    #[error("ticket option already exists: {0}")]
    AlreadyExists(TicketOptionId),
    #[error("allocation of {0} overflowed")]
    AllocationOverflow(TicketOptionId),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<SledError> for StorageError {
    fn from(err: SledError) -> Self {
        match err {
            SledError::NotFound(id) => StorageError::NotFound(id),
            SledError::AllocationExhausted { ticket_option_id, requested } => {
                StorageError::AllocationExhausted { ticket_option_id, requested }
            }
            SledError::Bincode(e) => StorageError::Serialization(Box::new(e)),
            other => StorageError::Backend(Box::new(other)),
        }
    }
}
