use async_trait::async_trait;

use crate::error::StorageError;
use crate::id::TicketOptionId;
use crate::model::{CreateTicketOption, Fulfillment, PurchaseTicketOption, TicketOption};

/// A backend able to hold ticket options and run the decrement-and-fulfill protocol.
///
/// Engines differ in how strong their guarantee is. A transactional engine makes the decrement,
/// the purchase and its tickets one atomic unit. A conditional-write engine only makes the
/// decrement atomic and reports a failure after it as [`StorageError::PartialFulfillment`].
///
/// Correctness under concurrent purchases is the engine's job: callers take no locks, and the
/// sum of successful decrements must never drive an allocation below zero.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    async fn create_ticket_option(&self, input: &CreateTicketOption) -> Result<TicketOption, StorageError>;

    async fn get_ticket_option(&self, id: &TicketOptionId) -> Result<TicketOption, StorageError>;

    /// Decrement the option's allocation by `input.quantity`, then create one purchase and
    /// `input.quantity` tickets referencing it.
    ///
    /// Returns [`StorageError::AllocationExhausted`] without writing anything when the remaining
    /// allocation is smaller than the quantity, and [`StorageError::NotFound`] when the option
    /// does not exist.
    async fn generate_tickets(&self, input: &PurchaseTicketOption) -> Result<Fulfillment, StorageError>;

    /// Release whatever the engine holds open (flush buffers, drain pools). Calls made after
    /// `close` may fail with a backend error.
    async fn close(&self) -> Result<(), StorageError> { Ok(()) }
}
