use boxoffice_core::{Purchase, PurchaseId, Ticket, TicketId, TicketOption, TicketOptionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored value of the `TICKETOPTION` item. The id lives in the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketOptionRecord {
    pub name: String,
    pub description: String,
    pub allocation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketOptionRecord {
    pub fn into_ticket_option(self, id: TicketOptionId) -> TicketOption {
        TicketOption {
            id,
            name: self.name,
            description: self.description,
            allocation: self.allocation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub purchase_id: PurchaseId,
    pub user_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseRecord {
    pub fn into_purchase(self, ticket_option_id: TicketOptionId) -> Purchase {
        Purchase {
            id: self.purchase_id,
            ticket_option_id,
            user_id: self.user_id,
            quantity: self.quantity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket_id: TicketId,
    pub purchase_id: PurchaseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketRecord {
    pub fn into_ticket(self, ticket_option_id: TicketOptionId) -> Ticket {
        Ticket {
            id: self.ticket_id,
            purchase_id: self.purchase_id,
            ticket_option_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
