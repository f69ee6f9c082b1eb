//! kvdns-srv: record store and authoritative resolution engine.
//!
//! Records live in a single redb file with one table per record type.
//! Single-field types are keyed by owner name; multi-field types store one
//! key per field as `name*field`.
//!
//! # Layers
//!
//! - [`store`]: per-type get/set/delete/list over the database
//! - [`answer`]: stored values to DNS RDATA
//! - [`resolver`]: DNS question to response message
//! - [`server`]: UDP and TCP listeners feeding the resolver
//! - [`api`]: HTTP record management sharing the served store

pub mod answer;
pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod server;
pub mod store;

// Re-exports for convenience.
pub use api::ManagementApi;
pub use config::ServerConfig;
pub use error::SrvError;
pub use resolver::Resolver;
pub use store::Store;

/// Result type for kvdns-srv operations.
pub type Result<T> = std::result::Result<T, SrvError>;
