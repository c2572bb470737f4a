use super::{ObjectStore, RetrievalError};
use async_trait::async_trait;
use aws_sdk_s3::{Client, error::DisplayErrorContext};

/// [`ObjectStore`] backed by Amazon S3.
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from shared SDK configuration.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    RetrievalError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    RetrievalError::Request {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&err).to_string(),
                    }
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|err| RetrievalError::Body {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            })?;

        let bytes = body.into_bytes().to_vec();
        tracing::debug!(bucket, key, bytes = bytes.len(), "Object downloaded");
        Ok(bytes)
    }
}
