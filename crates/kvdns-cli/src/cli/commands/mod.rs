//! Command implementations.

pub mod delete;
pub mod get;
pub mod list;
pub mod serve;
pub mod set;

use anyhow::{Context as _, Result};
use kvdns_core::{RecordType, RecordValue};
use kvdns_srv::{ServerConfig, Store};
use std::collections::{BTreeMap, BTreeSet};

use crate::client::ApiClient;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// Disable colors
    pub no_color: bool,

    /// Effective server configuration (file values plus flag overrides)
    pub config: ServerConfig,

    /// Management API of a running server; records go through it when set
    pub server: Option<String>,
}

impl Context {
    /// Open the record database named by the configuration.
    pub fn open_store(&self) -> Result<Store> {
        let path = &self.config.database;
        if self.verbose {
            tracing::debug!(database = %path.display(), "opening record store");
        }
        Store::open(path).with_context(|| {
            format!(
                "failed to open record database {} (if `kvdns serve` holds it, pass --server)",
                path.display()
            )
        })
    }

    /// Where record commands read and write.
    pub fn backend(&self) -> Result<Backend> {
        match &self.server {
            Some(url) => {
                if self.verbose {
                    tracing::debug!(server = %url, "using management API");
                }
                Ok(Backend::Remote(ApiClient::new(url)?))
            }
            None => Ok(Backend::Local(self.open_store()?)),
        }
    }
}

/// The database file directly, or a running server's management API.
#[derive(Debug)]
pub enum Backend {
    Local(Store),
    Remote(ApiClient),
}

impl Backend {
    pub async fn get(&self, rtype: RecordType, name: &str) -> Result<Option<RecordValue>> {
        match self {
            Self::Local(store) => Ok(store.get(rtype, name)?),
            Self::Remote(client) => client.get(rtype, name).await,
        }
    }

    pub async fn set(&self, name: &str, value: &RecordValue) -> Result<()> {
        match self {
            Self::Local(store) => Ok(store.set(name, value)?),
            Self::Remote(client) => client.set(name, value).await,
        }
    }

    pub async fn delete(&self, rtype: RecordType, name: &str) -> Result<bool> {
        match self {
            Self::Local(store) => Ok(store.delete(rtype, name)?),
            Self::Remote(client) => client.delete(rtype, name).await,
        }
    }

    /// Owner names per type; every type when `types` is empty.
    pub async fn list(&self, types: &[RecordType]) -> Result<BTreeMap<RecordType, BTreeSet<String>>> {
        match self {
            Self::Local(store) if types.is_empty() => Ok(store.list_all()?),
            Self::Local(store) => types
                .iter()
                .map(|&rtype| -> Result<(RecordType, BTreeSet<String>)> {
                    Ok((rtype, store.list_names(rtype)?))
                })
                .collect(),
            Self::Remote(client) => client.list(types).await,
        }
    }
}
