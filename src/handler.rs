//! Invocation surface: raw event payload in, `{statusCode, body}` out.
//!
//! Every failure, whichever stage or record raised it, collapses into a single `500` response
//! whose body carries the error description. The typed error is logged before it is discarded.

use crate::config::{Config, ConfigError};
use crate::event::NotificationEvent;
use crate::processing::{BatchSummary, ProcessingApi, ProcessingError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned when every record was processed.
pub const SUCCESS_MESSAGE: &str = "Documents processed successfully";

/// Response returned to the invoking runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// `200` on full-batch success, `500` otherwise.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded message string.
    pub body: String,
}

impl InvocationResponse {
    /// Successful response with the fixed confirmation message.
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: json_string(SUCCESS_MESSAGE),
        }
    }

    /// Failure response describing `error`.
    pub fn failure(error: &ProcessingError) -> Self {
        Self {
            status_code: 500,
            body: json_string(&format!("Error: {error}")),
        }
    }

    /// Whether this response reports success.
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Decoded message carried in `body`.
    pub fn message(&self) -> String {
        serde_json::from_str(&self.body).unwrap_or_else(|_| self.body.clone())
    }
}

fn json_string(message: &str) -> String {
    Value::String(message.to_string()).to_string()
}

/// Handle one invocation: decode the event, run the pipeline, and build the response.
///
/// `config` is whatever the caller loaded for this invocation; a configuration error is reported
/// like any other failure.
pub async fn handle_event<P>(
    pipeline: &P,
    config: Result<Config, ConfigError>,
    payload: Value,
) -> InvocationResponse
where
    P: ProcessingApi + ?Sized,
{
    match run(pipeline, config, payload).await {
        Ok(summary) => {
            tracing::info!(
                records = summary.records,
                documents = summary.metrics.documents_processed,
                bytes = summary.metrics.bytes_retrieved,
                characters = summary.metrics.characters_extracted,
                "Documents processed successfully"
            );
            InvocationResponse::success()
        }
        Err(error) => {
            tracing::error!(error = %error, "Error processing documents");
            InvocationResponse::failure(&error)
        }
    }
}

async fn run<P>(
    pipeline: &P,
    config: Result<Config, ConfigError>,
    payload: Value,
) -> Result<BatchSummary, ProcessingError>
where
    P: ProcessingApi + ?Sized,
{
    let config = config?;
    let event = NotificationEvent::from_value(payload)?;
    pipeline.process(&config, &event).await
}
