//! Classify, extract and scan one document.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::TextExtractor;
use super::classifier::{DocumentKind, classify};
use crate::error::DocumentError;
use crate::metrics::MetricExtractor;
use crate::models::document::SubmittedDocument;
use crate::models::extraction::ExtractionResult;
use crate::models::metrics::MetricSet;

/// Text and metrics produced for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub extraction: ExtractionResult,
    pub metrics: MetricSet,
}

/// Runs classification, text extraction and metric extraction for a document.
///
/// Holds no per-document state, so one processor can serve any number of
/// documents concurrently.
pub struct DocumentProcessor {
    pdf: Arc<dyn TextExtractor>,
    image: Arc<dyn TextExtractor>,
    metrics: MetricExtractor,
}

impl DocumentProcessor {
    pub fn new(pdf: Arc<dyn TextExtractor>, image: Arc<dyn TextExtractor>) -> Self {
        Self {
            pdf,
            image,
            metrics: MetricExtractor::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricExtractor) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the default pipeline: dual-strategy PDF extraction and OCR with
    /// the configured models.
    #[cfg(feature = "native")]
    pub fn from_config(config: &crate::models::config::MedscanConfig) -> Self {
        use crate::ocr::{ImageTextExtractor, PureOcrEngineFactory};
        use crate::pdf::PdfTextExtractor;

        let factory = PureOcrEngineFactory::new(config.models.clone(), config.ocr.clone());
        Self::new(
            Arc::new(PdfTextExtractor::from_config(config)),
            Arc::new(ImageTextExtractor::from_config(Arc::new(factory), config)),
        )
    }

    /// Process one document.
    ///
    /// A classification or extraction failure returns before metric
    /// extraction runs. A panic anywhere in extraction becomes
    /// [`DocumentError::Unexpected`].
    pub fn process(&self, doc: &SubmittedDocument) -> Result<ProcessedDocument, DocumentError> {
        let kind = classify(doc.content_type());
        debug!("Classified {} ({}) as {}", doc.name(), doc.content_type(), kind);

        let extractor = match kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Image => &self.image,
            DocumentKind::Unsupported => {
                return Err(DocumentError::UnsupportedFormat {
                    content_type: doc.content_type().to_string(),
                });
            }
        };

        let extraction = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(doc)))
            .map_err(|_| DocumentError::Unexpected(format!("extraction of {} panicked", doc.name())))??;

        let metrics = self.metrics.extract(&extraction.raw_text);

        info!(
            "Processed {}: {} characters via {}, {} metric fields",
            doc.name(),
            extraction.text_length(),
            extraction.method,
            metrics.field_count()
        );

        Ok(ProcessedDocument {
            extraction,
            metrics,
        })
    }
}
