//! Decrement-and-fulfill over conditional writes.
//!
//! 1. Conditionally decrement the option record: a compare-and-swap loop that refuses any write
//!    leaving the allocation below zero.
//! 2. Write the purchase record.
//! 3. Write every ticket record in a single batch.
//!
//! Steps 2 and 3 are not atomic with step 1. If either fails, the decrement has already landed.
//! The engine then compensates: it removes the purchase record if one was written and hands the
//! quantity back through the same conditional write. The failure surfaces as
//! [`StorageError::PartialFulfillment`], whose `compensated` flag tells whether that worked. The
//! compensation is itself not atomic with the decrement, so purchases running in between see the
//! reduced allocation.

use boxoffice_core::{error::StorageError, Fulfillment, PurchaseId, PurchaseTicketOption, TicketId, TicketOptionId};
use chrono::Utc;
use tracing::{debug, error, trace, warn};

use crate::{
    engine::SledStorageEngine,
    error::SledError,
    keys,
    record::{PurchaseRecord, TicketOptionRecord, TicketRecord},
};

impl SledStorageEngine {
    pub(crate) fn generate_tickets_blocking(&self, input: PurchaseTicketOption) -> Result<Fulfillment, StorageError> {
        let remaining = self.adjust_allocation(&input.ticket_option_id, -input.quantity)?;
        debug!("SledStorageEngine.generate_tickets: {} decremented by {}, {} remaining", input.ticket_option_id, input.quantity, remaining);

        let purchase_id = PurchaseId::generate();
        if let Err(err) = self.write_purchase(&input, &purchase_id) {
            return Err(self.compensate(&input, None, err));
        }

        match self.write_tickets(&input, &purchase_id) {
            Ok(ticket_ids) => Ok(Fulfillment { purchase_id, ticket_ids }),
            Err(err) => Err(self.compensate(&input, Some(&purchase_id), err)),
        }
    }

    /// Add `delta` to the option's allocation, unless the result would be negative.
    ///
    /// Reads the record, computes the new allocation, and swaps it in only if the record is still
    /// byte-for-byte what was read. A concurrent writer makes the swap fail, and the loop retries
    /// against the fresh value. Returns the allocation after the update.
    pub(crate) fn adjust_allocation(&self, id: &TicketOptionId, delta: i64) -> Result<i64, SledError> {
        let key = keys::ticket_option(id);
        loop {
            let Some(current) = self.items.get(&key)? else { return Err(SledError::NotFound(id.clone())) };
            let mut record: TicketOptionRecord = bincode::deserialize(&current)?;

            let remaining = record.allocation.checked_add(delta).ok_or_else(|| SledError::AllocationOverflow(id.clone()))?;
            if remaining < 0 {
                return Err(SledError::AllocationExhausted { ticket_option_id: id.clone(), requested: -delta });
            }

            record.allocation = remaining;
            record.updated_at = Utc::now();
            match self.items.compare_and_swap(&key, Some(&current), Some(bincode::serialize(&record)?))? {
                Ok(()) => return Ok(remaining),
                Err(_) => trace!("SledStorageEngine.adjust_allocation: {id} changed underneath, retrying"),
            }
        }
    }

    fn write_purchase(&self, input: &PurchaseTicketOption, purchase_id: &PurchaseId) -> Result<(), SledError> {
        let now = Utc::now();
        let record = PurchaseRecord {
            purchase_id: purchase_id.clone(),
            user_id: input.user_id.clone(),
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        };
        self.items.insert(keys::purchase(&input.ticket_option_id, purchase_id), bincode::serialize(&record)?)?;
        Ok(())
    }

    fn write_tickets(&self, input: &PurchaseTicketOption, purchase_id: &PurchaseId) -> Result<Vec<TicketId>, SledError> {
        #[cfg(test)]
        if tests::FAIL_TICKET_WRITES.with(std::cell::Cell::get) {
            return Err(SledError::Storage(sled::Error::Unsupported("ticket writes disabled".into())));
        }

        let now = Utc::now();
        let mut batch = sled::Batch::default();
        let mut ticket_ids = Vec::new();
        for _ in 0..input.quantity {
            let ticket_id = TicketId::generate();
            let record = TicketRecord { ticket_id: ticket_id.clone(), purchase_id: purchase_id.clone(), created_at: now, updated_at: now };
            batch.insert(keys::ticket(&input.ticket_option_id, &ticket_id), bincode::serialize(&record)?);
            ticket_ids.push(ticket_id);
        }

        self.items.apply_batch(batch)?;
        Ok(ticket_ids)
    }

    pub(crate) fn compensate(&self, input: &PurchaseTicketOption, purchase_id: Option<&PurchaseId>, cause: SledError) -> StorageError {
        warn!(
            "SledStorageEngine.generate_tickets: {} failed after decrementing by {}, compensating: {}",
            input.ticket_option_id, input.quantity, cause
        );

        let compensated = match self.undo_fulfillment(input, purchase_id) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "SledStorageEngine.generate_tickets: compensation failed, {} stays decremented by {}: {}",
                    input.ticket_option_id, input.quantity, err
                );
                false
            }
        };

        StorageError::PartialFulfillment {
            ticket_option_id: input.ticket_option_id.clone(),
            quantity: input.quantity,
            compensated,
            source: Box::new(cause),
        }
    }

    // the purchase goes first: restoring the allocation while the purchase survives would leave a
    // purchase with no decrement behind it
    fn undo_fulfillment(&self, input: &PurchaseTicketOption, purchase_id: Option<&PurchaseId>) -> Result<(), SledError> {
        if let Some(purchase_id) = purchase_id {
            self.items.remove(keys::purchase(&input.ticket_option_id, purchase_id))?;
        }
        self.adjust_allocation(&input.ticket_option_id, input.quantity)?;
        Ok(())
    }
}
