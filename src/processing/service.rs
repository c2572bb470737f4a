//! Pipeline service coordinating the storage, secret, embedding and document collaborators.

use crate::{
    config::Config,
    documents::{DatabaseTarget, DocumentRow, DocumentStore, PostgresDocumentStore},
    embedding::{BedrockEmbeddingClient, EmbeddingClient, EmbeddingError, EmbeddingRequest},
    event::{NotificationEvent, NotificationRecord},
    extraction::extract_text,
    metrics::BatchMetrics,
    processing::types::{BatchSummary, ProcessingError},
    secrets::{DatabaseCredentials, SecretStore, SecretsManagerStore},
    storage::{ObjectStore, S3ObjectStore},
};
use async_trait::async_trait;

/// Runs fetch → extract → embed → persist for every record of an event, one record at a time.
///
/// Collaborators are injected at construction and hold no per-invocation state; everything an
/// invocation needs (configuration, credentials) is obtained inside [`DocumentPipeline::process`].
pub struct DocumentPipeline {
    object_store: Box<dyn ObjectStore + Send + Sync>,
    secret_store: Box<dyn SecretStore + Send + Sync>,
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    document_store: Box<dyn DocumentStore + Send + Sync>,
}

/// Abstraction over the pipeline used by the invocation handler.
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Process every record of `event`, stopping at the first failure.
    async fn process(
        &self,
        config: &Config,
        event: &NotificationEvent,
    ) -> Result<BatchSummary, ProcessingError>;
}

struct ProcessedDocument {
    bytes: usize,
    characters: usize,
    dimension: usize,
}

impl DocumentPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new<O, S, E, D>(
        object_store: O,
        secret_store: S,
        embedding_client: E,
        document_store: D,
    ) -> Self
    where
        O: ObjectStore + Send + Sync + 'static,
        S: SecretStore + Send + Sync + 'static,
        E: EmbeddingClient + Send + Sync + 'static,
        D: DocumentStore + Send + Sync + 'static,
    {
        Self {
            object_store: Box::new(object_store),
            secret_store: Box::new(secret_store),
            embedding_client: Box::new(embedding_client),
            document_store: Box::new(document_store),
        }
    }

    /// Production wiring: S3, Secrets Manager, Bedrock and PostgreSQL.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(
            S3ObjectStore::from_sdk_config(sdk_config),
            SecretsManagerStore::from_sdk_config(sdk_config),
            BedrockEmbeddingClient::from_sdk_config(sdk_config),
            PostgresDocumentStore::new(),
        )
    }

    /// Replace the secret store, e.g. with static credentials for local runs.
    pub fn with_secret_store<S>(mut self, secret_store: S) -> Self
    where
        S: SecretStore + Send + Sync + 'static,
    {
        self.secret_store = Box::new(secret_store);
        self
    }

    /// Replace the document store, e.g. with an in-memory store for dry runs.
    pub fn with_document_store<D>(mut self, document_store: D) -> Self
    where
        D: DocumentStore + Send + Sync + 'static,
    {
        self.document_store = Box::new(document_store);
        self
    }

    /// Process every record of `event` in order.
    ///
    /// Credentials are fetched once, before the first record. The first failing record aborts
    /// the batch; rows already written for earlier records stay in place.
    pub async fn process(
        &self,
        config: &Config,
        event: &NotificationEvent,
    ) -> Result<BatchSummary, ProcessingError> {
        tracing::info!(records = event.len(), "Processing notification batch");
        let target = self.database_target(config).await?;

        let mut metrics = BatchMetrics::new();
        for record in event.records() {
            tracing::info!(bucket = %record.bucket, key = %record.key, "Processing document");
            let processed = match self.process_record(config, &target, record).await {
                Ok(processed) => processed,
                Err(error) => {
                    tracing::error!(
                        bucket = %record.bucket,
                        key = %record.key,
                        error = %error,
                        "Document processing failed"
                    );
                    return Err(error);
                }
            };
            metrics.record_document(processed.bytes, processed.characters, processed.dimension);
            tracing::info!(
                key = %record.key,
                bytes = processed.bytes,
                characters = processed.characters,
                dimension = processed.dimension,
                "Successfully processed document"
            );
        }

        Ok(BatchSummary {
            records: event.len(),
            metrics: metrics.snapshot(),
        })
    }

    async fn database_target(&self, config: &Config) -> Result<DatabaseTarget, ProcessingError> {
        let secret = self
            .secret_store
            .fetch_secret(&config.db_secret_arn)
            .await?;
        let credentials = DatabaseCredentials::from_secret_json(&secret)?;
        tracing::debug!(
            host = %credentials.host,
            port = credentials.port,
            dbname = %credentials.dbname,
            "Database credentials loaded"
        );
        Ok(DatabaseTarget {
            credentials,
            table: config.documents_table.clone(),
            connect_timeout: config.db_connect_timeout,
            tls: config.db_tls.clone(),
        })
    }

    async fn process_record(
        &self,
        config: &Config,
        target: &DatabaseTarget,
        record: &NotificationRecord,
    ) -> Result<ProcessedDocument, ProcessingError> {
        let content = self
            .object_store
            .get(&record.bucket, &record.key)
            .await?;
        let bytes = content.len();

        let extracted = extract_text(&record.key, &content, &config.unsupported_format)?;
        drop(content);
        let characters = extracted.text.chars().count();
        tracing::debug!(
            key = %record.key,
            format = ?extracted.format,
            characters,
            "Text extracted"
        );

        let request =
            EmbeddingRequest::new(extracted.text).with_dimensions(config.embedding_dimension);
        let embedding = self
            .embedding_client
            .embed(&config.embedding_model, &request)
            .await?;
        if let Some(expected) = config.embedding_dimension {
            if embedding.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                }
                .into());
            }
        }
        let dimension = embedding.len();

        let row = DocumentRow {
            id: record.key.clone(),
            content: request.input_text,
            embedding,
        };
        self.document_store.upsert(target, &row).await?;

        Ok(ProcessedDocument {
            bytes,
            characters,
            dimension,
        })
    }
}

#[async_trait]
impl ProcessingApi for DocumentPipeline {
    async fn process(
        &self,
        config: &Config,
        event: &NotificationEvent,
    ) -> Result<BatchSummary, ProcessingError> {
        DocumentPipeline::process(self, config, event).await
    }
}
