use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{ServiceError, StorageError};
use crate::id::TicketOptionId;
use crate::model::{CreateTicketOption, Fulfillment, PurchaseTicketOption, TicketOption};
use crate::storage::StorageEngine;

/// Backend-agnostic entry point for creating, reading and purchasing ticket options.
///
/// The service validates input before anything reaches storage, translates storage failures into
/// [`ServiceError`], and double checks every fulfillment: a storage engine that reports success
/// with fewer ticket ids than were purchased is treated as a failure.
#[derive(Clone)]
pub struct TicketOptionService {
    storage: Arc<dyn StorageEngine>,
    timeout: Option<Duration>,
}

impl TicketOptionService {
    pub fn new(storage: Arc<dyn StorageEngine>) -> Self { Self { storage, timeout: None } }

    /// Abort any storage call that runs longer than `timeout`. The in-flight future is dropped,
    /// which rolls back a transactional engine.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageEngine> { &self.storage }

    pub async fn create_ticket_option(&self, input: CreateTicketOption) -> Result<TicketOption, ServiceError> {
        if input.allocation < 0 {
            return Err(ServiceError::Validation(format!("allocation must be non-negative, got {}", input.allocation)));
        }

        let ticket_option = self.bounded("create_ticket_option", self.storage.create_ticket_option(&input)).await?;
        debug!("TicketOptionService.create_ticket_option: {} with allocation {}", ticket_option.id, ticket_option.allocation);
        Ok(ticket_option)
    }

    pub async fn get_ticket_option(&self, id: &TicketOptionId) -> Result<TicketOption, ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::Validation("ticket option id is required".to_owned()));
        }
        self.bounded("get_ticket_option", self.storage.get_ticket_option(id)).await
    }

    pub async fn purchase_ticket_option(&self, input: PurchaseTicketOption) -> Result<Fulfillment, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::Validation(format!("quantity must be positive, got {}", input.quantity)));
        }
        if input.ticket_option_id.is_empty() {
            return Err(ServiceError::Validation("ticket option id is required".to_owned()));
        }
        if input.user_id.is_empty() {
            return Err(ServiceError::Validation("user id is required".to_owned()));
        }

        let fulfillment = match self.run("generate_tickets", self.storage.generate_tickets(&input)).await? {
            Ok(fulfillment) => fulfillment,
            Err(StorageError::PartialFulfillment { ticket_option_id, quantity, compensated, source }) => {
                if compensated {
                    warn!("purchase of {quantity} from {ticket_option_id} failed after the decrement and was compensated: {source}");
                } else {
                    error!("purchase of {quantity} from {ticket_option_id} left an orphaned allocation decrement: {source}");
                }
                return Err(ServiceError::internal(StorageError::PartialFulfillment { ticket_option_id, quantity, compensated, source }));
            }
            Err(err) => return Err(err.into()),
        };

        let generated = fulfillment.ticket_ids.len();
        if i64::try_from(generated).is_ok_and(|generated| generated < input.quantity) {
            error!(
                purchase_id = %fulfillment.purchase_id,
                "storage returned {generated} ticket ids for a purchase of {} from {}", input.quantity, input.ticket_option_id
            );
            return Err(ServiceError::InsufficientTicketsGenerated { requested: input.quantity, generated });
        }

        info!(purchase_id = %fulfillment.purchase_id, user_id = %input.user_id, "purchase generated");
        for ticket_id in &fulfillment.ticket_ids {
            debug!(ticket_id = %ticket_id, "ticket generated");
        }

        Ok(fulfillment)
    }

    pub async fn close(&self) -> Result<(), ServiceError> { Ok(self.storage.close().await?) }

    async fn bounded<T>(&self, operation: &str, fut: impl Future<Output = Result<T, StorageError>>) -> Result<T, ServiceError> {
        Ok(self.run(operation, fut).await??)
    }

    /// Applies the configured timeout, leaving the storage result untouched.
    async fn run<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<Result<T, StorageError>, ServiceError> {
        let Some(limit) = self.timeout else { return Ok(fut.await) };
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => Ok(result),
            Err(elapsed) => {
                warn!("TicketOptionService.{operation}: timed out after {limit:?}");
                Err(ServiceError::internal(elapsed))
            }
        }
    }
}
