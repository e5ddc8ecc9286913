//! Dual-strategy PDF text extraction.

use tracing::{debug, info, warn};

use super::fallback::TokenStreamStrategy;
use super::primary::TextLayerStrategy;
use super::validate::validate_pdf;
use super::{PdfStrategy, StrategyOutput};
use crate::document::TextExtractor;
use crate::error::{DocumentError, PdfError};
use crate::models::config::{DEFAULT_MAX_FILE_SIZE, MedscanConfig};
use crate::models::document::SubmittedDocument;
use crate::models::extraction::ExtractionResult;

/// Extracts text from PDF documents.
///
/// The primary strategy runs first. The fallback runs exactly once, and only
/// when the primary fails or returns whitespace. Strategies never run
/// concurrently for the same document.
pub struct PdfTextExtractor {
    primary: Box<dyn PdfStrategy>,
    fallback: Box<dyn PdfStrategy>,
    max_file_size: u64,
}

impl PdfTextExtractor {
    /// Create an extractor with the text-layer parser and the token-stream fallback.
    pub fn new() -> Self {
        Self::with_strategies(
            Box::new(TextLayerStrategy::new()),
            Box::new(TokenStreamStrategy::new()),
        )
    }

    /// Create an extractor with custom strategies.
    pub fn with_strategies(primary: Box<dyn PdfStrategy>, fallback: Box<dyn PdfStrategy>) -> Self {
        Self {
            primary,
            fallback,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn from_config(config: &MedscanConfig) -> Self {
        Self::new().with_max_file_size(config.documents.max_file_size_bytes)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Run the strategies over a payload that already passed validation.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<ExtractionResult, DocumentError> {
        let primary_err = match run(self.primary.as_ref(), data) {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };
        warn!("Primary PDF parsing failed, trying fallback: {}", primary_err);

        match run(self.fallback.as_ref(), data) {
            Ok(result) => Ok(result),
            Err(fallback_err) => {
                warn!("Fallback PDF parsing failed: {}", fallback_err);
                Err(DocumentError::PdfExtractionFailed {
                    primary: primary_err.to_string(),
                    fallback: fallback_err.to_string(),
                })
            }
        }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, doc: &SubmittedDocument) -> Result<ExtractionResult, DocumentError> {
        validate_pdf(doc, self.max_file_size)?;
        debug!("Extracting text from PDF {} ({} bytes)", doc.name(), doc.byte_size());
        self.extract_bytes(doc.content())
    }
}

fn run(strategy: &dyn PdfStrategy, data: &[u8]) -> Result<ExtractionResult, PdfError> {
    let StrategyOutput { text, page_count } = strategy.extract(data)?;

    if text.trim().is_empty() {
        return Err(PdfError::EmptyText);
    }

    info!(
        "Extracted {} characters with the {} parser",
        text.chars().count(),
        strategy.method()
    );

    let result = ExtractionResult::new(text, strategy.method());
    Ok(match page_count {
        Some(pages) => result.with_page_count(pages),
        None => result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::extraction::ExtractionMethod;
    use crate::pdf::PDF_CONTENT_TYPE;
    use crate::test_support;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStrategy {
        method: ExtractionMethod,
        output: std::result::Result<&'static str, PdfError>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeStrategy {
        fn boxed(
            method: ExtractionMethod,
            output: std::result::Result<&'static str, PdfError>,
        ) -> (Box<dyn PdfStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = FakeStrategy {
                method,
                output,
                calls: calls.clone(),
            };
            (Box::new(strategy), calls)
        }
    }

    impl PdfStrategy for FakeStrategy {
        fn method(&self) -> ExtractionMethod {
            self.method
        }

        fn extract(&self, _data: &[u8]) -> crate::pdf::Result<StrategyOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output.clone().map(|text| StrategyOutput {
                text: text.to_string(),
                page_count: Some(1),
            })
        }
    }

    fn pdf_doc(content: Vec<u8>) -> SubmittedDocument {
        SubmittedDocument::new("report.pdf", PDF_CONTENT_TYPE, content)
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let (primary, primary_calls) = FakeStrategy::boxed(ExtractionMethod::Primary, Ok("BP: 120/80"));
        let (fallback, fallback_calls) = FakeStrategy::boxed(ExtractionMethod::Fallback, Ok("unused"));
        let extractor = PdfTextExtractor::with_strategies(primary, fallback);

        let result = extractor.extract_bytes(b"%PDF-1.4").unwrap();

        assert_eq!(result.method, ExtractionMethod::Primary);
        assert_eq!(result.raw_text, "BP: 120/80");
        assert_eq!(result.page_count, Some(1));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_whitespace_primary_runs_fallback_once() {
        let (primary, primary_calls) = FakeStrategy::boxed(ExtractionMethod::Primary, Ok("  \n\t "));
        let (fallback, fallback_calls) = FakeStrategy::boxed(ExtractionMethod::Fallback, Ok("TSH: 2.1 mIU/L"));
        let extractor = PdfTextExtractor::with_strategies(primary, fallback);

        let result = extractor.extract_bytes(b"%PDF-1.4").unwrap();

        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_primary_error_runs_fallback() {
        let (primary, _) = FakeStrategy::boxed(
            ExtractionMethod::Primary,
            Err(PdfError::Parse("Invalid xref table".into())),
        );
        let (fallback, fallback_calls) = FakeStrategy::boxed(ExtractionMethod::Fallback, Ok("text"));
        let extractor = PdfTextExtractor::with_strategies(primary, fallback);

        let result = extractor.extract_bytes(b"%PDF-1.4").unwrap();
        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_both_fail_carries_both_reasons() {
        let (primary, _) = FakeStrategy::boxed(
            ExtractionMethod::Primary,
            Err(PdfError::Parse("Invalid xref table".into())),
        );
        let (fallback, fallback_calls) = FakeStrategy::boxed(
            ExtractionMethod::Fallback,
            Err(PdfError::TextExtraction {
                page: 3,
                reason: "bad stream".into(),
            }),
        );
        let extractor = PdfTextExtractor::with_strategies(primary, fallback);

        match extractor.extract_bytes(b"%PDF-1.4") {
            Err(DocumentError::PdfExtractionFailed { primary, fallback }) => {
                assert!(primary.contains("Invalid xref table"));
                assert!(fallback.contains("page 3"));
            }
            other => panic!("expected PdfExtractionFailed, got {:?}", other),
        }
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_document_runs_no_strategy() {
        let (primary, primary_calls) = FakeStrategy::boxed(ExtractionMethod::Primary, Ok("text"));
        let (fallback, fallback_calls) = FakeStrategy::boxed(ExtractionMethod::Fallback, Ok("text"));
        let extractor = PdfTextExtractor::with_strategies(primary, fallback);

        let result = extractor.extract(&pdf_doc(b"GIF89a not a pdf".to_vec()));

        assert!(matches!(result, Err(DocumentError::InvalidDocument(_))));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_size_limit_from_builder() {
        let extractor = PdfTextExtractor::new().with_max_file_size(4);
        let result = extractor.extract(&pdf_doc(b"%PDF-1.4 body".to_vec()));
        assert!(matches!(result, Err(DocumentError::InvalidDocument(_))));
    }

    #[test]
    fn test_real_pdf_end_to_end() {
        let data = test_support::pdf(&[&["Patient: Jane Doe", "Blood Glucose: 95 mg/dl"]]);
        let result = PdfTextExtractor::new().extract(&pdf_doc(data)).unwrap();

        assert!(matches!(
            result.method,
            ExtractionMethod::Primary | ExtractionMethod::Fallback
        ));
        assert!(result.raw_text.contains("95"));
        assert_eq!(result.page_count, Some(1));
    }

    #[test]
    fn test_blank_pdf_fails_both_methods() {
        let data = test_support::pdf(&[&[]]);
        let result = PdfTextExtractor::new().extract(&pdf_doc(data));
        assert!(matches!(result, Err(DocumentError::PdfExtractionFailed { .. })));
    }
}
