use serde::Serialize;

/// Counters describing one invocation's work, reported once the batch completes.
#[derive(Debug, Default)]
pub struct BatchMetrics {
    documents_processed: u64,
    bytes_retrieved: u64,
    characters_extracted: u64,
    embedding_values: u64,
}

impl BatchMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a persisted document.
    pub fn record_document(&mut self, bytes: usize, characters: usize, dimension: usize) {
        self.documents_processed += 1;
        self.bytes_retrieved += bytes as u64;
        self.characters_extracted += characters as u64;
        self.embedding_values += dimension as u64;
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed,
            bytes_retrieved: self.bytes_retrieved,
            characters_extracted: self.characters_extracted,
            embedding_values: self.embedding_values,
        }
    }
}

/// Immutable view of batch counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Documents fetched, embedded and persisted.
    pub documents_processed: u64,
    /// Raw bytes downloaded from object storage.
    pub bytes_retrieved: u64,
    /// Characters of extracted text sent for embedding.
    pub characters_extracted: u64,
    /// Sum of embedding vector lengths persisted.
    pub embedding_values: u64,
}
