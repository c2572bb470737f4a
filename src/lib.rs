#![deny(missing_docs)]

//! Event-driven document pipeline: fetch an uploaded object, extract its text, embed it, and
//! upsert the result into a pgvector table.

/// Invocation-scoped configuration.
pub mod config;
/// Document row persistence.
pub mod documents;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Object-creation notification payloads.
pub mod event;
/// Text extraction by file extension.
pub mod extraction;
/// Invocation handler producing the status-code response.
pub mod handler;
/// Structured logging and tracing setup.
pub mod logging;
/// Per-invocation counters.
pub mod metrics;
/// Document pipeline orchestration.
pub mod processing;
/// Secret retrieval and database credentials.
pub mod secrets;
/// Object storage access.
pub mod storage;
