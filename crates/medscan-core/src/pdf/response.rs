//! Single-PDF parse request and its JSON response.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::extractor::PdfTextExtractor;
use super::validate::validate_pdf;
use crate::error::DocumentError;
use crate::models::document::SubmittedDocument;
use crate::models::extraction::ExtractionMethod;

/// Form field the document must be submitted under.
pub const FILE_FIELD: &str = "file";

/// One uploaded PDF and the form field it arrived in.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub field_name: String,
    pub document: Option<SubmittedDocument>,
}

impl ParseRequest {
    /// A request carrying a document in the expected field.
    pub fn new(document: SubmittedDocument) -> Self {
        Self {
            field_name: FILE_FIELD.to_string(),
            document: Some(document),
        }
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    fn file(&self) -> Option<&SubmittedDocument> {
        if self.field_name == FILE_FIELD {
            self.document.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseInfo {
    pub pages: Option<u32>,
    pub text_length: usize,
    pub method: ExtractionMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseDetails {
    /// Reasons reported by each PDF strategy.
    Strategies { primary: String, fallback: String },
    Message(String),
}

/// JSON body returned for a parse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseResponse {
    Success {
        text: String,
        info: ParseInfo,
    },
    Failure {
        #[serde(skip)]
        status: u16,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<ParseDetails>,
    },
}

impl ParseResponse {
    fn failure(status: u16, error: impl Into<String>, details: Option<ParseDetails>) -> Self {
        ParseResponse::Failure {
            status,
            error: error.into(),
            details,
        }
    }

    /// HTTP-style status code of the response.
    pub fn status(&self) -> u16 {
        match self {
            ParseResponse::Success { .. } => 200,
            ParseResponse::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResponse::Success { .. })
    }
}

/// Validate and parse one PDF, mapping every outcome onto a response.
pub fn handle_parse(request: &ParseRequest, extractor: &PdfTextExtractor) -> ParseResponse {
    let Some(doc) = request.file() else {
        error!("No file uploaded");
        return ParseResponse::failure(400, "No file uploaded", None);
    };

    info!("File size: {} bytes", doc.content().len());

    if let Err(e) = validate_pdf(doc, extractor.max_file_size()) {
        warn!("PDF validation failed: {}", e);
        return match e {
            DocumentError::InvalidDocument(reason) => ParseResponse::failure(400, reason, None),
            other => ParseResponse::failure(400, other.user_message(), None),
        };
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract_bytes(doc.content())));

    match outcome {
        Ok(Ok(result)) => ParseResponse::Success {
            info: ParseInfo {
                pages: result.page_count,
                text_length: result.text_length(),
                method: result.method,
            },
            text: result.raw_text,
        },
        Ok(Err(DocumentError::PdfExtractionFailed { primary, fallback })) => ParseResponse::failure(
            400,
            "Failed to parse PDF with both methods",
            Some(ParseDetails::Strategies { primary, fallback }),
        ),
        Ok(Err(e)) => {
            error!("Error processing file: {}", e);
            ParseResponse::failure(500, "Error processing file", Some(ParseDetails::Message(e.to_string())))
        }
        Err(_) => {
            error!("PDF extraction panicked");
            ParseResponse::failure(
                500,
                "Error processing file",
                Some(ParseDetails::Message("internal error during extraction".to_string())),
            )
        }
    }
}
