use super::{SecretError, SecretStore};
use async_trait::async_trait;
use aws_sdk_secretsmanager::{Client, error::DisplayErrorContext};

/// [`SecretStore`] backed by AWS Secrets Manager.
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    /// Wrap an existing Secrets Manager client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from shared SDK configuration.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn fetch_secret(&self, reference: &str) -> Result<String, SecretError> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(reference)
            .send()
            .await
            .map_err(|err| SecretError::Request {
                reference: reference.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretError::NotString(reference.to_string()))
    }
}
