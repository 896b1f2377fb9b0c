pub mod error;
pub mod id;
pub mod model;
pub mod service;
pub mod storage;

pub use error::{ServiceError, StorageError};
pub use id::{PurchaseId, TicketId, TicketOptionId};
pub use model::{CreateTicketOption, Fulfillment, Purchase, PurchaseTicketOption, Ticket, TicketOption};
pub use service::TicketOptionService;
pub use storage::StorageEngine;
