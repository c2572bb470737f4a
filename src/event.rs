//! Object-creation notification payloads.
//!
//! Only the fields the pipeline consumes are modelled: the bucket name and object key of each
//! record. Everything else in the S3 notification document is ignored.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a notification payload.
#[derive(Debug, Error)]
pub enum EventError {
    /// Payload did not match the notification shape.
    #[error("malformed notification event: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Object key carried an invalid percent-encoding.
    #[error("object key '{key}' is not valid URL encoding: {reason}")]
    InvalidKey {
        /// Raw key as delivered in the notification.
        key: String,
        /// Decoder diagnostic.
        reason: String,
    },
}

/// One object-creation notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Name of the bucket holding the new object.
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
}

/// Ordered batch of notifications delivered in a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationEvent {
    records: Vec<NotificationRecord>,
}

impl NotificationEvent {
    /// Decode a raw invocation payload.
    pub fn from_value(payload: Value) -> Result<Self, EventError> {
        let raw: RawEvent = serde_json::from_value(payload)?;
        let records = raw
            .records
            .into_iter()
            .map(|record| {
                Ok(NotificationRecord {
                    bucket: record.s3.bucket.name,
                    key: decode_object_key(&record.s3.object.key)?,
                })
            })
            .collect::<Result<Vec<_>, EventError>>()?;
        Ok(Self { records })
    }

    /// Records in delivery order.
    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode an S3 notification key (`+` for space, `%XX` escapes).
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|err| EventError::InvalidKey {
            key: raw.to_string(),
            reason: err.to_string(),
        })
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "Records")]
    records: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct RawRecord {
    s3: RawS3Entity,
}

#[derive(Deserialize)]
struct RawS3Entity {
    bucket: RawBucket,
    object: RawObject,
}

#[derive(Deserialize)]
struct RawBucket {
    name: String,
}

#[derive(Deserialize)]
struct RawObject {
    key: String,
}
