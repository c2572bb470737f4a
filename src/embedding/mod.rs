//! Embedding client abstraction and the Bedrock adapter.

mod bedrock;

pub use bedrock::BedrockEmbeddingClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport or service failure while invoking the model.
    #[error("embedding request to model '{model}' failed: {message}")]
    Request {
        /// Model that was invoked.
        model: String,
        /// Provider diagnostic.
        message: String,
    },
    /// Response body did not carry a usable `embedding` field.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    /// Model returned a vector of unexpected length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length configured through `EMBEDDING_DIMENSION`.
        expected: usize,
        /// Length returned by the model.
        actual: usize,
    },
}

/// Body sent to the embedding model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingRequest {
    /// Text to embed.
    #[serde(rename = "inputText")]
    pub input_text: String,
    /// Requested output length, for models that support it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

impl EmbeddingRequest {
    /// Request an embedding for `text` with the model's default length.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            input_text: text.into(),
            dimensions: None,
        }
    }

    /// Request a specific output length.
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Decode a model response body into its embedding vector.
pub fn parse_embedding_response(body: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    let response: EmbeddingResponse = serde_json::from_slice(body)
        .map_err(|err| EmbeddingError::MalformedResponse(err.to_string()))?;
    let embedding = response.embedding.ok_or_else(|| {
        EmbeddingError::MalformedResponse("response has no 'embedding' field".to_string())
    })?;
    if embedding.is_empty() {
        return Err(EmbeddingError::MalformedResponse(
            "response carried an empty embedding".to_string(),
        ));
    }
    Ok(embedding)
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce the embedding vector for one request using `model_id`.
    async fn embed(
        &self,
        model_id: &str,
        request: &EmbeddingRequest,
    ) -> Result<Vec<f32>, EmbeddingError>;
}
