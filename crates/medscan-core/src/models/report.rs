//! Outbound report handed to the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extraction::ExtractionResult;
use super::metrics::{AggregatedMetricSet, MetricSet};
use crate::error::{ErrorKind, MedscanError};

/// Per-document record for a successfully processed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Original file name.
    pub name: String,
    /// Position of the document in the submitted list.
    pub index: usize,
    /// When the document was received.
    pub uploaded_at: DateTime<Utc>,
    /// When processing finished.
    pub analyzed_at: DateTime<Utc>,
    /// Extracted text and the strategy that produced it.
    pub extraction: ExtractionResult,
    /// Metrics found in this document alone.
    pub metrics: MetricSet,
}

/// Record for a document that contributed nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub name: String,
    pub index: usize,
    pub kind: ErrorKind,
    /// User-facing message; parser diagnostics are only logged.
    pub message: String,
}

/// Everything produced for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub submitted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Metrics merged across documents.
    pub aggregated: AggregatedMetricSet,
    /// Successful documents, in completion order.
    pub documents: Vec<DocumentReport>,
    /// Failed documents, in completion order.
    pub failures: Vec<DocumentFailure>,
}

impl AnalysisReport {
    /// Number of documents submitted with the request.
    pub fn submitted_count(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Fail the request when documents were submitted but none could be processed.
    ///
    /// An empty request, or one whose documents simply contain no metrics,
    /// is a success.
    pub fn ensure_any_succeeded(&self) -> Result<(), MedscanError> {
        if self.documents.is_empty() && !self.failures.is_empty() {
            return Err(MedscanError::NoDocumentsProcessed {
                failed: self.failures.len(),
            });
        }
        Ok(())
    }

    /// Successful documents sorted by submission index.
    pub fn documents_in_submission_order(&self) -> Vec<&DocumentReport> {
        let mut docs: Vec<&DocumentReport> = self.documents.iter().collect();
        docs.sort_by_key(|d| d.index);
        docs
    }
}
