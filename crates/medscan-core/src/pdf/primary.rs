//! Primary strategy: the structured text layer as read by `pdf-extract`.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use super::{PdfStrategy, Result, StrategyOutput};
use crate::error::PdfError;
use crate::models::extraction::ExtractionMethod;

/// Reads the text layer of the whole document with `pdf-extract`.
///
/// `pdf-extract` can panic on malformed input instead of returning an error,
/// so every call runs inside `catch_unwind`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayerStrategy;

impl TextLayerStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl PdfStrategy for TextLayerStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Primary
    }

    fn extract(&self, data: &[u8]) -> Result<StrategyOutput> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        let pages = match outcome {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(PdfError::Parse(e.to_string())),
            Err(_) => return Err(PdfError::Panicked),
        };

        debug!("pdf-extract returned {} pages", pages.len());

        Ok(StrategyOutput {
            page_count: Some(pages.len() as u32),
            text: pages.join("\n"),
        })
    }
}
