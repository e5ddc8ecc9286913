//! Error types for the medscan-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to users for any extraction problem. Parser diagnostics stay in logs.
pub const UNREADABLE_FILE_MESSAGE: &str =
    "Unable to read this file. The file may be corrupted or unreadable; please upload a clear PDF or image.";

/// Main error type for the medscan library.
#[derive(Error, Debug)]
pub enum MedscanError {
    /// A single document could not be processed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Every submitted document failed.
    #[error("none of the {failed} submitted documents could be processed")]
    NoDocumentsProcessed { failed: usize },
}

/// Per-document failure. Never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Declared content type is neither PDF nor an image.
    #[error("unsupported file type: {content_type}")]
    UnsupportedFormat { content_type: String },

    /// The document fails a structural precondition.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Both PDF strategies were exhausted.
    #[error("failed to parse PDF with both methods (primary: {primary}; fallback: {fallback})")]
    PdfExtractionFailed { primary: String, fallback: String },

    /// Recognition produced no usable text.
    #[error("OCR extraction failed: {0}")]
    OcrExtractionFailed(String),

    /// Anything else that went wrong while processing the document.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Serializable classification of a [`DocumentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    InvalidDocument,
    PdfExtractionFailed,
    OcrExtractionFailed,
    UnexpectedFailure,
}

impl DocumentError {
    /// Error kind for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            DocumentError::InvalidDocument(_) => ErrorKind::InvalidDocument,
            DocumentError::PdfExtractionFailed { .. } => ErrorKind::PdfExtractionFailed,
            DocumentError::OcrExtractionFailed(_) => ErrorKind::OcrExtractionFailed,
            DocumentError::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }

    /// Generic, actionable message safe to show to a user.
    ///
    /// Validation messages are already user-facing and pass through. Extraction
    /// failures collapse into [`UNREADABLE_FILE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            DocumentError::UnsupportedFormat { .. } => {
                "Unsupported file type. Please upload a PDF or an image file.".to_string()
            }
            DocumentError::InvalidDocument(reason) => reason.clone(),
            DocumentError::PdfExtractionFailed { .. }
            | DocumentError::OcrExtractionFailed(_)
            | DocumentError::Unexpected(_) => UNREADABLE_FILE_MESSAGE.to_string(),
        }
    }
}

/// Errors raised by a single PDF extraction strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text from page {page}: {reason}")]
    TextExtraction { page: u32, reason: String },

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The strategy ran but produced only whitespace.
    #[error("no text found in PDF")]
    EmptyText,

    /// The underlying parser panicked.
    #[error("PDF parser panicked (malformed document)")]
    Panicked,
}

/// Errors related to OCR processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Image could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Recognition finished without any text.
    #[error("no text extracted from image")]
    EmptyText,
}

/// Failure of a single metric family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Captured text could not be converted to the field's numeric type.
    #[error("failed to parse {family}: {value}")]
    Parse { family: &'static str, value: String },

    /// The pattern matched but a capture group was missing.
    #[error("pattern for {family} matched without capture group {group}")]
    MissingCapture { family: &'static str, group: usize },
}

/// Result type for the medscan library.
pub type Result<T> = std::result::Result<T, MedscanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_kinds() {
        let err = DocumentError::UnsupportedFormat {
            content_type: "text/plain".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(
            DocumentError::Unexpected("boom".into()).kind(),
            ErrorKind::UnexpectedFailure
        );
    }

    #[test]
    fn test_user_message_hides_parser_details() {
        let err = DocumentError::PdfExtractionFailed {
            primary: "Invalid xref table".to_string(),
            fallback: "failed to extract text from page 2: bad stream".to_string(),
        };
        let message = err.user_message();
        assert!(!message.contains("xref"));
        assert!(message.contains("corrupted or unreadable"));

        // Both diagnostics are kept on the error itself.
        let display = err.to_string();
        assert!(display.contains("Invalid xref table"));
        assert!(display.contains("page 2"));
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::PdfExtractionFailed).unwrap();
        assert_eq!(json, "\"pdf_extraction_failed\"");
    }
}
