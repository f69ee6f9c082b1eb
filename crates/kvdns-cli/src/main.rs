//! kvdns - key-value backed authoritative DNS
//!
//! Manage records in a kvdns store and serve them.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    kvdns_cli::run().await
}
