//! Key layout of the single `items` tree.
//!
//! Every record belonging to a ticket option shares its partition (the option id) and is told apart
//! by a typed sort key, so a prefix scan over `<option id>\0` yields the option, its purchases and
//! their tickets.
//!
//! | record        | key                                   |
//! |---------------|---------------------------------------|
//! | ticket option | `<option id>\0TICKETOPTION`           |
//! | purchase      | `<option id>\0PURCHASE#<purchase id>` |
//! | ticket        | `<option id>\0TICKET#<ticket id>`     |

use boxoffice_core::{PurchaseId, TicketId, TicketOptionId};

pub const SEPARATOR: u8 = 0;
pub const TICKET_OPTION: &str = "TICKETOPTION";
pub const PURCHASE_PREFIX: &str = "PURCHASE#";
pub const TICKET_PREFIX: &str = "TICKET#";

pub fn partition(id: &TicketOptionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(id.as_str().len() + 1);
    key.extend_from_slice(id.as_str().as_bytes());
    key.push(SEPARATOR);
    key
}

fn key(id: &TicketOptionId, sort_key: &str) -> Vec<u8> {
    let mut key = partition(id);
    key.extend_from_slice(sort_key.as_bytes());
    key
}

pub fn ticket_option(id: &TicketOptionId) -> Vec<u8> { key(id, TICKET_OPTION) }

pub fn purchase(id: &TicketOptionId, purchase_id: &PurchaseId) -> Vec<u8> { key(id, &format!("{PURCHASE_PREFIX}{purchase_id}")) }

pub fn ticket(id: &TicketOptionId, ticket_id: &TicketId) -> Vec<u8> { key(id, &format!("{TICKET_PREFIX}{ticket_id}")) }

/// The prefix shared by every record of one kind within a partition.
pub fn kind_prefix(id: &TicketOptionId, kind_prefix: &str) -> Vec<u8> { key(id, kind_prefix) }
