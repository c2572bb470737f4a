//! Text extraction keyed on the object key's file extension.
//!
//! Plain-text formats are decoded as (lossy) UTF-8, PDFs go through `pdf-extract`, and DOCX
//! files are read paragraph by paragraph with `docx-rs`. Extensions outside that set follow the
//! configured [`UnsupportedFormatPolicy`], so a given key always yields the same outcome.

mod parsers;

use thiserror::Error;

/// Errors raised while deriving text from document bytes.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Extension is not handled and the policy rejects unknown formats.
    #[error("unsupported document format '{extension}' for key '{key}'")]
    UnsupportedFormat {
        /// Object key that was being processed.
        key: String,
        /// Lower-cased extension, empty when the key has none.
        extension: String,
    },
    /// Parser could not read the document.
    #[error("failed to parse {format} document '{key}': {reason}")]
    Parse {
        /// Format that was attempted.
        format: DocumentFormat,
        /// Object key that was being processed.
        key: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// Document parsed but contained no text.
    #[error("no text could be extracted from '{0}'")]
    EmptyDocument(String),
}

/// How extraction treats extensions it does not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnsupportedFormatPolicy {
    /// Fail with [`ExtractionError::UnsupportedFormat`].
    #[default]
    Reject,
    /// Substitute the given text for the document content.
    Placeholder(String),
}

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UTF-8 text, including markdown, CSV and JSON.
    PlainText,
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl DocumentFormat {
    /// Resolve a format from a lower-cased file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "txt" | "text" | "md" | "markdown" | "csv" | "tsv" | "json" | "log" => {
                Some(Self::PlainText)
            }
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PlainText => "text",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        };
        f.write_str(name)
    }
}

/// Text extracted from a document, tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Extracted content.
    pub text: String,
    /// Parser used, or `None` when the unsupported-format placeholder was applied.
    pub format: Option<DocumentFormat>,
}

/// Lower-cased extension of the final path segment of `key`, if any.
pub fn file_extension(key: &str) -> Option<String> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Extract text from `content`, dispatching on the extension of `key`.
pub fn extract_text(
    key: &str,
    content: &[u8],
    policy: &UnsupportedFormatPolicy,
) -> Result<ExtractedText, ExtractionError> {
    let extension = file_extension(key).unwrap_or_default();
    let Some(format) = DocumentFormat::from_extension(&extension) else {
        return match policy {
            UnsupportedFormatPolicy::Reject => Err(ExtractionError::UnsupportedFormat {
                key: key.to_string(),
                extension,
            }),
            UnsupportedFormatPolicy::Placeholder(text) => {
                tracing::warn!(key, extension = %extension, "Unsupported format; using placeholder text");
                Ok(ExtractedText {
                    text: text.clone(),
                    format: None,
                })
            }
        };
    };

    let text = match format {
        DocumentFormat::PlainText => parsers::decode_text(content),
        DocumentFormat::Pdf => parsers::pdf_text(content).map_err(|reason| {
            ExtractionError::Parse {
                format,
                key: key.to_string(),
                reason,
            }
        })?,
        DocumentFormat::Docx => parsers::docx_text(content).map_err(|reason| {
            ExtractionError::Parse {
                format,
                key: key.to_string(),
                reason,
            }
        })?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyDocument(key.to_string()));
    }

    Ok(ExtractedText {
        text,
        format: Some(format),
    })
}
