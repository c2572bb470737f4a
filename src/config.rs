use crate::documents::{SslMode, TableName, TableNameError, TlsSettings};
use crate::extraction::UnsupportedFormatPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Placeholder text used when `UNSUPPORTED_FORMAT_POLICY=placeholder` and no override is set.
pub const DEFAULT_UNSUPPORTED_PLACEHOLDER: &str = "Unsupported document format";

const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_TABLE: &str = "documents";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Schema or table name for the documents table was rejected.
    #[error("Invalid documents table: {0}")]
    InvalidTable(#[from] TableNameError),
}

/// Invocation-scoped configuration for the document pipeline.
///
/// Built fresh for every invocation and passed into
/// [`crate::processing::DocumentPipeline::process`]; nothing here is cached between calls.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret reference (ARN or name) holding the database credentials.
    pub db_secret_arn: String,
    /// Bedrock model identifier used for embeddings.
    pub embedding_model: String,
    /// Optional vector length requested from, and enforced on, the embedding model.
    pub embedding_dimension: Option<usize>,
    /// What extraction does with file extensions it does not understand.
    pub unsupported_format: UnsupportedFormatPolicy,
    /// Target table for document rows.
    pub documents_table: TableName,
    /// Connect timeout applied when opening the PostgreSQL connection.
    pub db_connect_timeout: Duration,
    /// TLS negotiation for PostgreSQL connections.
    pub db_tls: TlsSettings,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, performing validation along the way.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let db_secret_arn = vars.required("DB_SECRET_ARN")?;
        let embedding_model = vars.required("EMBEDDING_MODEL")?;

        let unsupported_format = match vars.optional("UNSUPPORTED_FORMAT_POLICY").as_deref() {
            None => UnsupportedFormatPolicy::Reject,
            Some(value) => match value.trim().to_lowercase().as_str() {
                "reject" => UnsupportedFormatPolicy::Reject,
                "placeholder" => UnsupportedFormatPolicy::Placeholder(
                    vars.optional("UNSUPPORTED_FORMAT_PLACEHOLDER")
                        .unwrap_or_else(|| DEFAULT_UNSUPPORTED_PLACEHOLDER.to_string()),
                ),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "UNSUPPORTED_FORMAT_POLICY".to_string(),
                    ));
                }
            },
        };

        let documents_table = TableName::new(
            vars.optional("DOCUMENTS_SCHEMA")
                .unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            vars.optional("DOCUMENTS_TABLE")
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        )?;

        let embedding_dimension = vars
            .parsed::<usize>("EMBEDDING_DIMENSION")?
            .map(|value| {
                if value == 0 {
                    Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))
                } else {
                    Ok(value)
                }
            })
            .transpose()?;

        let db_tls = TlsSettings {
            mode: vars.parsed::<SslMode>("DB_SSL_MODE")?.unwrap_or_default(),
            root_cert: vars.optional("DB_SSL_ROOT_CERT").map(PathBuf::from),
        };

        Ok(Self {
            db_secret_arn,
            embedding_model,
            embedding_dimension,
            unsupported_format,
            documents_table,
            db_connect_timeout: Duration::from_secs(
                vars.parsed("DB_CONNECT_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            db_tls,
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

/// Load `.env` overrides into the process environment. Missing files are ignored.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env overrides");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DB_SECRET_ARN", "arn:aws:secretsmanager:us-east-1:123:secret:db"),
        ("EMBEDDING_MODEL", "amazon.titan-embed-text-v2:0"),
    ];

    #[test]
    fn loads_required_values_with_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config");
        assert_eq!(
            config.db_secret_arn,
            "arn:aws:secretsmanager:us-east-1:123:secret:db"
        );
        assert_eq!(config.embedding_model, "amazon.titan-embed-text-v2:0");
        assert_eq!(config.embedding_dimension, None);
        assert_eq!(config.unsupported_format, UnsupportedFormatPolicy::Reject);
        assert_eq!(config.documents_table.qualified(), "\"public\".\"documents\"");
        assert_eq!(config.db_connect_timeout, Duration::from_secs(10));
        assert_eq!(config.db_tls, TlsSettings::default());
        assert_eq!(config.db_tls.mode, SslMode::Prefer);
    }

    #[test]
    fn missing_secret_arn_is_reported_by_name() {
        let error =
            Config::from_lookup(lookup(&[("EMBEDDING_MODEL", "model")])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingVariable(ref key) if key == "DB_SECRET_ARN"));
    }

    #[test]
    fn blank_model_counts_as_missing() {
        let error = Config::from_lookup(lookup(&[
            ("DB_SECRET_ARN", "secret"),
            ("EMBEDDING_MODEL", "   "),
        ]))
        .unwrap_err();
        assert_eq!(error.to_string(), "Missing environment variable: EMBEDDING_MODEL");
    }

    #[test]
    fn placeholder_policy_uses_default_text() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("UNSUPPORTED_FORMAT_POLICY", "Placeholder"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(
            config.unsupported_format,
            UnsupportedFormatPolicy::Placeholder(DEFAULT_UNSUPPORTED_PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn placeholder_text_can_be_overridden() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("UNSUPPORTED_FORMAT_POLICY", "placeholder"));
        pairs.push(("UNSUPPORTED_FORMAT_PLACEHOLDER", "binary upload"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(
            config.unsupported_format,
            UnsupportedFormatPolicy::Placeholder("binary upload".to_string())
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("UNSUPPORTED_FORMAT_POLICY", "ignore"));
        let error = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "UNSUPPORTED_FORMAT_POLICY"));
    }

    #[test]
    fn dimension_must_be_positive_integer() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EMBEDDING_DIMENSION", "0"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EMBEDDING_DIMENSION", "wide"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EMBEDDING_DIMENSION", "512"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.embedding_dimension, Some(512));
    }

    #[test]
    fn custom_table_and_timeout() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DOCUMENTS_SCHEMA", "rag"));
        pairs.push(("DOCUMENTS_TABLE", "kb_documents"));
        pairs.push(("DB_CONNECT_TIMEOUT_SECS", "3"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.documents_table.qualified(), "\"rag\".\"kb_documents\"");
        assert_eq!(config.db_connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn ssl_mode_and_root_bundle_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_SSL_MODE", "verify-full"));
        pairs.push(("DB_SSL_ROOT_CERT", "/opt/certs/global-bundle.pem"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(config.db_tls.mode, SslMode::VerifyFull);
        assert_eq!(
            config.db_tls.root_cert,
            Some(PathBuf::from("/opt/certs/global-bundle.pem"))
        );
    }

    #[test]
    fn unknown_ssl_mode_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_SSL_MODE", "sometimes"));
        let error = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "DB_SSL_MODE"));
    }

    #[test]
    fn missing_required_variable_wins_over_invalid_optional() {
        let error = Config::from_lookup(lookup(&[
            ("EMBEDDING_MODEL", "model"),
            ("UNSUPPORTED_FORMAT_POLICY", "ignore"),
            ("DB_SSL_MODE", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::MissingVariable(ref key) if key == "DB_SECRET_ARN"));
    }
}
