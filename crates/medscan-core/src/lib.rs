//! Core library for medical report processing.
//!
//! This crate provides:
//! - Document classification by declared content type
//! - PDF text extraction with a primary text-layer parser and a token-stream fallback
//! - Image text extraction through a scoped OCR engine
//! - Clinical metric extraction (blood pressure, glucose, cholesterol, TSH)
//! - Concurrent multi-document processing with a pluggable merge policy

pub mod batch;
pub mod document;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use batch::{BatchAggregator, FirstCompletedWins, MergeStrategy};
pub use document::{DocumentKind, DocumentProcessor, ProcessedDocument, TextExtractor, classify};
pub use error::{DocumentError, ErrorKind, MedscanError, Result};
pub use metrics::MetricExtractor;
pub use models::document::SubmittedDocument;
pub use models::extraction::{ExtractionMethod, ExtractionResult};
pub use models::metrics::{AggregatedMetricSet, BloodPressure, MetricSet};
pub use models::report::{AnalysisReport, DocumentFailure, DocumentReport};
pub use ocr::{EngineLease, ImageTextExtractor, OcrEngine, OcrEngineFactory};
#[cfg(feature = "native")]
pub use ocr::{PureOcrEngine, PureOcrEngineFactory};
pub use pdf::{ParseRequest, ParseResponse, PdfStrategy, PdfTextExtractor};

#[cfg(test)]
pub(crate) mod test_support;
