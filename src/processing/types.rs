//! Outcome and error types for the document pipeline.

use crate::{
    config::ConfigError,
    documents::PersistenceError,
    embedding::EmbeddingError,
    event::EventError,
    extraction::ExtractionError,
    metrics::MetricsSnapshot,
    secrets::{CredentialsError, SecretError},
    storage::RetrievalError,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort an invocation.
///
/// The stage variants (`Retrieval`, `Extraction`, `Embedding`, `Persistence`) identify where a
/// record failed; the remaining variants cover failures outside the per-record stages.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Object could not be fetched from storage.
    #[error("Failed to retrieve document: {0}")]
    Retrieval(#[from] RetrievalError),
    /// Text could not be derived from the document bytes.
    #[error("Failed to extract text: {0}")]
    Extraction(#[from] ExtractionError),
    /// Embedding model invocation failed or returned an unusable vector.
    #[error("Failed to generate embedding: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Document row could not be written.
    #[error("Failed to persist document: {0}")]
    Persistence(#[from] PersistenceError),
    /// Database credentials could not be fetched.
    #[error("Failed to fetch database credentials: {0}")]
    Secret(#[from] SecretError),
    /// Database credentials were fetched but could not be parsed.
    #[error("Failed to read database credentials: {0}")]
    Credentials(#[from] CredentialsError),
    /// Invocation payload was not a notification event.
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] EventError),
    /// Invocation configuration was missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Summary of a fully processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of records in the event.
    pub records: usize,
    /// Counters accumulated while processing.
    pub metrics: MetricsSnapshot,
}
