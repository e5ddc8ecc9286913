//! PDF processing module.

mod extractor;
mod fallback;
mod primary;
mod response;
mod validate;

pub use extractor::PdfTextExtractor;
pub use fallback::TokenStreamStrategy;
pub use primary::TextLayerStrategy;
pub use response::{FILE_FIELD, ParseDetails, ParseInfo, ParseRequest, ParseResponse, handle_parse};
pub use validate::{PDF_CONTENT_TYPE, PDF_SIGNATURE, validate_pdf};

use crate::error::PdfError;
use crate::models::extraction::ExtractionMethod;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text produced by one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    /// Extracted text, not yet trimmed.
    pub text: String,
    /// Number of pages, if the strategy knows it.
    pub page_count: Option<u32>,
}

/// One way of turning PDF bytes into text.
pub trait PdfStrategy: Send + Sync {
    /// Method reported when this strategy succeeds.
    fn method(&self) -> ExtractionMethod;

    /// Extract text from a PDF payload. Whitespace-only text is checked by the caller.
    fn extract(&self, data: &[u8]) -> Result<StrategyOutput>;
}
