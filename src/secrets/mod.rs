//! Secret retrieval and database credential parsing.

mod aws;

pub use aws::SecretsManagerStore;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

/// Errors raised by secret stores.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret service rejected or failed the request.
    #[error("failed to fetch secret '{reference}': {message}")]
    Request {
        /// Secret reference that was requested.
        reference: String,
        /// Service diagnostic.
        message: String,
    },
    /// The secret exists but carries no string value.
    #[error("secret '{0}' has no string value")]
    NotString(String),
}

/// Secret JSON could not be turned into [`DatabaseCredentials`].
///
/// The message never echoes secret values: only missing-field names and positions are kept.
#[derive(Debug, Error)]
#[error("malformed database credentials: {reason}")]
pub struct CredentialsError {
    reason: String,
}

impl From<serde_json::Error> for CredentialsError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let reason = if message.starts_with("missing field") {
            message
        } else {
            format!(
                "{:?} error at line {} column {}",
                err.classify(),
                err.line(),
                err.column()
            )
        };
        Self { reason }
    }
}

/// Source of secret strings.
#[async_trait]
pub trait SecretStore {
    /// Fetch the string value of the referenced secret.
    async fn fetch_secret(&self, reference: &str) -> Result<String, SecretError>;
}

/// Secret store that always returns the same value, for local runs.
#[derive(Clone)]
pub struct StaticSecretStore {
    value: String,
}

impl StaticSecretStore {
    /// Serve `value` for every reference.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn fetch_secret(&self, reference: &str) -> Result<String, SecretError> {
        tracing::debug!(reference, "Serving static secret");
        Ok(self.value.clone())
    }
}

/// Connection parameters for the document database.
#[derive(Clone, Deserialize)]
pub struct DatabaseCredentials {
    /// Database host name.
    pub host: String,
    /// Database port.
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    /// Database name.
    pub dbname: String,
    /// Login role.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl DatabaseCredentials {
    /// Parse the JSON document stored in the secret.
    pub fn from_secret_json(secret: &str) -> Result<Self, CredentialsError> {
        Ok(serde_json::from_str(secret)?)
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}
