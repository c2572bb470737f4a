use super::{DatabaseTarget, DocumentRow, DocumentStore, PersistenceError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Row as held by [`MemoryDocumentStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Extracted text.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Time of the most recent write.
    pub updated_at: OffsetDateTime,
    /// Number of writes applied to this id.
    pub revision: u64,
}

/// In-process [`DocumentStore`] with the same upsert semantics as the PostgreSQL backend.
///
/// Used for dry runs; clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    rows: Arc<Mutex<BTreeMap<String, StoredDocument>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row by id.
    pub async fn get(&self, id: &str) -> Option<StoredDocument> {
        self.rows.lock().await.get(id).cloned()
    }

    /// Snapshot of all rows ordered by id.
    pub async fn rows(&self) -> Vec<(String, StoredDocument)> {
        self.rows
            .lock()
            .await
            .iter()
            .map(|(id, row)| (id.clone(), row.clone()))
            .collect()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(
        &self,
        _target: &DatabaseTarget,
        row: &DocumentRow,
    ) -> Result<(), PersistenceError> {
        let mut rows = self.rows.lock().await;
        let revision = rows.get(&row.id).map_or(1, |existing| existing.revision + 1);
        rows.insert(
            row.id.clone(),
            StoredDocument {
                content: row.content.clone(),
                embedding: row.embedding.clone(),
                updated_at: OffsetDateTime::now_utc(),
                revision,
            },
        );
        Ok(())
    }
}
