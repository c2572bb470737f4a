//! Document pipeline: retrieve, extract, embed, and persist each notified object in turn.

mod service;
pub mod types;

pub use service::{DocumentPipeline, ProcessingApi};
pub use types::{BatchSummary, ProcessingError};
