//! Records persisted by every storage engine, and the inputs/outputs of the fulfillment protocol.
//!
//! Ownership runs `TicketOption <- Purchase <- Ticket`. A ticket option's `allocation` is the
//! *remaining* capacity; nothing tracks the number sold, so for every option
//! `sum(purchase.quantity) + allocation` equals the allocation it was created with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PurchaseId, TicketId, TicketOptionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketOption {
    pub id: TicketOptionId,
    pub name: String,
    pub description: String,
    /// Remaining purchasable quantity. Never negative.
    pub allocation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub ticket_option_id: TicketOptionId,
    pub user_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub purchase_id: PurchaseId,
    pub ticket_option_id: TicketOptionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketOption {
    pub name: String,
    pub description: String,
    pub allocation: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTicketOption {
    pub ticket_option_id: TicketOptionId,
    pub user_id: String,
    pub quantity: i64,
}

/// The outcome of a successful decrement-and-fulfill: one purchase and its tickets, in the
/// order the storage engine produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub purchase_id: PurchaseId,
    pub ticket_ids: Vec<TicketId>,
}
