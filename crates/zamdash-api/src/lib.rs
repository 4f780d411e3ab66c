// zamdash-api: Async Rust client for the Zammad ticket REST API.

pub mod client;
pub mod error;
pub mod models;
pub mod tickets;
pub mod transport;

pub use client::TicketApi;
pub use error::Error;
pub use models::{TicketRecord, User};
pub use transport::{TlsMode, TransportConfig};
