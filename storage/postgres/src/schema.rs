//! Tables, statements and constraint names of the transactional engine.
//!
//! Every id is a `uuid` generated by the database, so the store hands back the identity of each
//! row it creates.

/// Name of the check constraint that keeps `ticket_options.allocation` non-negative. A violation
/// of this constraint, and only this one, means the allocation was exhausted.
pub const ALLOCATION_CHECK: &str = "ticket_options_allocation_check";

pub const CREATE_SCHEMA: &str = r#"
CREATE EXTENSION IF NOT EXISTS pgcrypto;

CREATE TABLE IF NOT EXISTS ticket_options (
    "id"          uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    "name"        text NOT NULL,
    "description" text NOT NULL,
    "allocation"  bigint NOT NULL,
    "created_at"  timestamptz NOT NULL DEFAULT now(),
    "updated_at"  timestamptz NOT NULL DEFAULT now(),
    CONSTRAINT ticket_options_allocation_check CHECK ("allocation" >= 0)
);

CREATE TABLE IF NOT EXISTS purchases (
    "id"               uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    "ticket_option_id" uuid NOT NULL REFERENCES ticket_options("id"),
    "user_id"          text NOT NULL,
    "quantity"         bigint NOT NULL CHECK ("quantity" > 0),
    "created_at"       timestamptz NOT NULL DEFAULT now(),
    "updated_at"       timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS purchases_ticket_option_id_idx ON purchases("ticket_option_id");

CREATE TABLE IF NOT EXISTS tickets (
    "id"               uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    "ticket_option_id" uuid NOT NULL REFERENCES ticket_options("id"),
    "purchase_id"      uuid NOT NULL REFERENCES purchases("id"),
    "created_at"       timestamptz NOT NULL DEFAULT now(),
    "updated_at"       timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS tickets_purchase_id_idx ON tickets("purchase_id");
CREATE INDEX IF NOT EXISTS tickets_ticket_option_id_idx ON tickets("ticket_option_id");
"#;

pub const INSERT_TICKET_OPTION: &str = r#"INSERT INTO ticket_options("name", "description", "allocation")
    VALUES($1, $2, $3)
    RETURNING "id", "name", "description", "allocation", "created_at", "updated_at""#;

pub const SELECT_TICKET_OPTION: &str =
    r#"SELECT "id", "name", "description", "allocation", "created_at", "updated_at" FROM ticket_options WHERE "id" = $1"#;

pub const DECREMENT_ALLOCATION: &str =
    r#"UPDATE ticket_options SET "allocation" = "allocation" - $1, "updated_at" = now() WHERE "id" = $2"#;

pub const INSERT_PURCHASE: &str = r#"INSERT INTO purchases("ticket_option_id", "user_id", "quantity") VALUES($1, $2, $3) RETURNING "id""#;

/// One statement inserts the whole batch; `RETURNING` yields the ids in insertion order.
pub const INSERT_TICKETS: &str = r#"INSERT INTO tickets("ticket_option_id", "purchase_id")
    SELECT $1, $2 FROM generate_series(1, $3::bigint)
    RETURNING "id""#;

pub const SELECT_PURCHASES: &str = r#"SELECT "id", "ticket_option_id", "user_id", "quantity", "created_at", "updated_at"
    FROM purchases WHERE "ticket_option_id" = $1 ORDER BY "created_at", "id""#;

pub const SELECT_TICKETS: &str = r#"SELECT "id", "purchase_id", "ticket_option_id", "created_at", "updated_at"
    FROM tickets WHERE "ticket_option_id" = $1 ORDER BY "created_at", "id""#;
