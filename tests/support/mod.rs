#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docpipe::{
    config::Config,
    documents::{DatabaseTarget, DocumentRow, DocumentStore, PersistenceError},
    embedding::{EmbeddingClient, EmbeddingError, EmbeddingRequest},
    secrets::{SecretError, SecretStore},
    storage::{ObjectStore, RetrievalError},
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const BUCKET: &str = "uploads";
pub const MODEL: &str = "amazon.titan-embed-text-v2:0";
pub const SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:000000000000:secret:docdb";
pub const CREDENTIALS: &str =
    r#"{"host":"db.internal","port":5432,"dbname":"kb","username":"ingest","password":"pw"}"#;

pub fn config_with(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DB_SECRET_ARN".to_string(), SECRET_ARN.to_string()),
        ("EMBEDDING_MODEL".to_string(), MODEL.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub fn config() -> Config {
    config_with(&[])
}

/// Build an S3 notification payload; keys are passed through as delivered.
pub fn s3_event(keys: &[&str]) -> Value {
    let records: Vec<Value> = keys
        .iter()
        .map(|key| {
            json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": BUCKET },
                    "object": { "key": key }
                }
            })
        })
        .collect();
    json!({ "Records": records })
}

#[derive(Clone, Default)]
pub struct FakeObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeObjectStore {
    pub async fn put(&self, key: &str, content: &[u8]) {
        self.objects
            .lock()
            .await
            .insert((BUCKET.to_string(), key.to_string()), content.to_vec());
    }

    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        self.fetched.lock().await.push(key.to_string());
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

#[derive(Clone)]
pub struct CountingSecretStore {
    value: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl CountingSecretStore {
    pub fn new(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            value: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for CountingSecretStore {
    async fn fetch_secret(&self, reference: &str) -> Result<String, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.clone().ok_or_else(|| SecretError::Request {
            reference: reference.to_string(),
            message: "AccessDeniedException".to_string(),
        })
    }
}

/// Embeds text into a small deterministic vector; fails for text containing `fail_marker`.
#[derive(Clone)]
pub struct FakeEmbedder {
    dimension: usize,
    fail_marker: Option<String>,
    requests: Arc<Mutex<Vec<(String, EmbeddingRequest)>>>,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail_marker: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub async fn requests(&self) -> Vec<(String, EmbeddingRequest)> {
        self.requests.lock().await.clone()
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = text.len() as f32;
        (0..self.dimension).map(|i| seed + i as f32).collect()
    }
}

#[async_trait]
impl EmbeddingClient for FakeEmbedder {
    async fn embed(
        &self,
        model_id: &str,
        request: &EmbeddingRequest,
    ) -> Result<Vec<f32>, EmbeddingError> {
        self.requests
            .lock()
            .await
            .push((model_id.to_string(), request.clone()));
        if let Some(marker) = &self.fail_marker {
            if request.input_text.contains(marker.as_str()) {
                return Err(EmbeddingError::Request {
                    model: model_id.to_string(),
                    message: "ThrottlingException".to_string(),
                });
            }
        }
        Ok(self.vector_for(&request.input_text))
    }
}

#[derive(Clone, Copy, Default)]
pub struct UnreachableDatabase;

#[async_trait]
impl DocumentStore for UnreachableDatabase {
    async fn upsert(
        &self,
        target: &DatabaseTarget,
        _row: &DocumentRow,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::Connect {
            host: target.credentials.host.clone(),
            port: target.credentials.port,
            message: format!("connection refused (sslmode={})", target.tls.mode),
        })
    }
}
