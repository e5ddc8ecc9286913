//! Text extraction output.

use serde::{Deserialize, Serialize};

/// Strategy that produced the raw text of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Structured PDF text-layer parser.
    Primary,
    /// Page-by-page PDF token-stream reader.
    Fallback,
    /// Optical character recognition on a raster image.
    Ocr,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Primary => write!(f, "primary"),
            ExtractionMethod::Fallback => write!(f, "fallback"),
            ExtractionMethod::Ocr => write!(f, "ocr"),
        }
    }
}

/// Raw text extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text. Non-empty after trimming on success.
    pub raw_text: String,
    /// Strategy that succeeded.
    pub method: ExtractionMethod,
    /// Number of pages, when the strategy knows it (PDF only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl ExtractionResult {
    pub fn new(raw_text: impl Into<String>, method: ExtractionMethod) -> Self {
        Self {
            raw_text: raw_text.into(),
            method,
            page_count: None,
        }
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    /// Length of the extracted text in UTF-16 code units, the unit clients
    /// receive as `textLength`.
    pub fn text_length(&self) -> usize {
        self.raw_text.encode_utf16().count()
    }
}
