//! Document classification and per-document processing.

mod classifier;
mod processor;

pub use classifier::{DocumentKind, classify};
pub use processor::{DocumentProcessor, ProcessedDocument};

use crate::error::DocumentError;
use crate::models::document::SubmittedDocument;
use crate::models::extraction::ExtractionResult;

/// Turns a submitted document into raw text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, doc: &SubmittedDocument) -> Result<ExtractionResult, DocumentError>;
}
