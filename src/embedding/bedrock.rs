use super::{EmbeddingClient, EmbeddingError, EmbeddingRequest, parse_embedding_response};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{Client, error::DisplayErrorContext, primitives::Blob};

const JSON_CONTENT_TYPE: &str = "application/json";

/// [`EmbeddingClient`] that calls `InvokeModel` on Amazon Bedrock.
pub struct BedrockEmbeddingClient {
    client: Client,
}

impl BedrockEmbeddingClient {
    /// Wrap an existing Bedrock runtime client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from shared SDK configuration.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl EmbeddingClient for BedrockEmbeddingClient {
    async fn embed(
        &self,
        model_id: &str,
        request: &EmbeddingRequest,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let body = serde_json::to_vec(request).map_err(|err| EmbeddingError::Request {
            model: model_id.to_string(),
            message: err.to_string(),
        })?;

        tracing::debug!(
            model = model_id,
            characters = request.input_text.chars().count(),
            dimensions = ?request.dimensions,
            "Invoking embedding model"
        );

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|err| EmbeddingError::Request {
                model: model_id.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        parse_embedding_response(response.body().as_ref())
    }
}
