//! HTTP surface of the boxoffice service.
//!
//! [`Server`] wires a storage engine into a [`boxoffice_core::TicketOptionService`] and serves the
//! routes in [`routes`]. [`config::Config`] reads the process environment once at startup.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError, StorageConfig};
pub use error::ApiError;
pub use routes::router;
pub use server::{Server, ServerBuilder};
pub use state::AppState;
