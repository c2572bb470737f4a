//! Document row persistence: upsert `(id, content, embedding)` into a pgvector table.

mod memory;
mod postgres;
mod table;
mod tls;

pub use memory::{MemoryDocumentStore, StoredDocument};
pub use postgres::{PostgresDocumentStore, upsert_sql};
pub use table::{TableName, TableNameError, quote_ident};
pub use tls::{SslMode, TlsError, TlsSettings};

use crate::secrets::DatabaseCredentials;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while writing a document row.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Connection to the database could not be established.
    #[error("failed to connect to {host}:{port}: {message}")]
    Connect {
        /// Database host.
        host: String,
        /// Database port.
        port: u16,
        /// Driver diagnostic.
        message: String,
    },
    /// Upsert statement failed.
    #[error("failed to upsert document '{id}': {message}")]
    Write {
        /// Document id being written.
        id: String,
        /// Driver diagnostic.
        message: String,
    },
    /// Transaction could not be committed.
    #[error("failed to commit document '{id}': {message}")]
    Commit {
        /// Document id being written.
        id: String,
        /// Driver diagnostic.
        message: String,
    },
}

/// Row written for each processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    /// Object key of the source document.
    pub id: String,
    /// Extracted text.
    pub content: String,
    /// Embedding of `content`.
    pub embedding: Vec<f32>,
}

/// Where and how to connect for one invocation's writes.
#[derive(Debug, Clone)]
pub struct DatabaseTarget {
    /// Credentials fetched for this invocation.
    pub credentials: DatabaseCredentials,
    /// Table receiving the rows.
    pub table: TableName,
    /// Connect timeout for each connection.
    pub connect_timeout: Duration,
    /// TLS negotiation for each connection.
    pub tls: TlsSettings,
}

/// Storage backend for document rows.
#[async_trait]
pub trait DocumentStore {
    /// Insert `row`, or replace content and embedding of the existing row with the same id.
    async fn upsert(&self, target: &DatabaseTarget, row: &DocumentRow)
    -> Result<(), PersistenceError>;
}
