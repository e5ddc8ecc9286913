//! Cheap structural checks run before any PDF parser.

use crate::error::DocumentError;
use crate::models::document::SubmittedDocument;

/// Content type accepted by the PDF path.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Literal that must appear in the first bytes of every PDF.
pub const PDF_SIGNATURE: &str = "%PDF-";

const HEADER_LEN: usize = 8;

/// Validate a document for the PDF path.
///
/// Fails fast with [`DocumentError::InvalidDocument`] carrying a user-facing
/// reason. No parser runs when this fails.
pub fn validate_pdf(doc: &SubmittedDocument, max_file_size: u64) -> Result<(), DocumentError> {
    let invalid = |reason: &str| Err(DocumentError::InvalidDocument(reason.to_string()));

    if doc.content_type().trim().to_lowercase() != PDF_CONTENT_TYPE {
        return invalid("Invalid file type. Please upload a PDF file.");
    }

    if !doc.name().to_lowercase().ends_with(".pdf") {
        return invalid("Invalid file extension. Please upload a PDF file.");
    }

    if doc.byte_size() == 0 {
        return invalid("File is empty");
    }

    if doc.byte_size() > max_file_size || doc.content().len() as u64 > max_file_size {
        return invalid(&format!(
            "File is too large. Maximum size is {}MB.",
            max_file_size / (1024 * 1024)
        ));
    }

    let data = doc.content();
    if data.is_empty() {
        return invalid("Failed to read file content");
    }

    if data.len() < HEADER_LEN {
        return invalid("File is too small to be a valid PDF");
    }

    let header = String::from_utf8_lossy(&data[..HEADER_LEN]);
    if !header.contains(PDF_SIGNATURE) {
        return invalid("Invalid PDF format. File may be corrupted.");
    }

    Ok(())
}
