//! Object storage access: retrieve the raw bytes of an uploaded document.

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching an object.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The object does not exist in the bucket.
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was requested.
        key: String,
    },
    /// The storage service rejected or failed the request.
    #[error("failed to fetch s3://{bucket}/{key}: {message}")]
    Request {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was requested.
        key: String,
        /// Service diagnostic.
        message: String,
    },
    /// The response body could not be read to completion.
    #[error("failed to read body of s3://{bucket}/{key}: {message}")]
    Body {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was requested.
        key: String,
        /// Stream diagnostic.
        message: String,
    },
}

/// Read-only access to an object store.
#[async_trait]
pub trait ObjectStore {
    /// Fetch the full content of `key` in `bucket`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError>;
}
