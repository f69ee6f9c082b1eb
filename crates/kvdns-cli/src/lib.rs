//! # kvdns-cli
//!
//! Command-line interface for kvdns record stores.
//!
//! ## Features
//!
//! - **Record management**: get, set, delete and list records by type
//! - **Serving**: answer DNS queries over UDP and TCP from the store
//! - **Live edits**: manage a served store through its HTTP API (`--server`)
//! - **Output formats**: pretty tables or JSON

pub mod cli;
pub mod client;
pub mod config;
pub mod output;

pub use cli::run;
