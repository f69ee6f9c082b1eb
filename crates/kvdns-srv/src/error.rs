//! Error types for the kvdns record store and DNS listener.

use kvdns_core::CoreError;
use thiserror::Error;

/// Errors that can occur in kvdns-srv operations.
#[derive(Error, Debug)]
pub enum SrvError {
    /// Database file could not be opened or created.
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Read or write transaction could not be started.
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Record partition could not be opened.
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage I/O failed inside a transaction.
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Write transaction failed to commit.
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Record failed to encode, decode or validate.
    #[error(transparent)]
    Record(#[from] CoreError),

    /// Management request body does not describe a record.
    #[error("invalid record body: {0}")]
    Body(String),

    /// Stored record could not be turned into an answer.
    #[error("answer error: {0}")]
    Answer(String),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// DNS or management listener failed to bind or run.
    #[error("server error: {0}")]
    Server(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SrvError {
    /// True if the caller supplied a bad record or name.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        match self {
            Self::Body(_) => true,
            Self::Record(e) => e.is_input_error(),
            _ => false,
        }
    }
}
