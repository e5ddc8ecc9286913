//! Fan-out over documents with first-completed-wins aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::merge::{FirstCompletedWins, MergeStrategy};
use crate::document::{DocumentProcessor, ProcessedDocument};
use crate::error::DocumentError;
use crate::models::document::SubmittedDocument;
use crate::models::metrics::AggregatedMetricSet;
use crate::models::report::{AnalysisReport, DocumentFailure, DocumentReport};

/// Outcome of one document task.
struct Completed {
    index: usize,
    name: String,
    uploaded_at: DateTime<Utc>,
    result: Result<ProcessedDocument, DocumentError>,
}

/// Processes every document of a request concurrently and merges the metrics.
///
/// A failing document is recorded and logged; it never aborts the batch.
pub struct BatchAggregator {
    processor: Arc<DocumentProcessor>,
    merge: Arc<dyn MergeStrategy>,
    max_concurrent: usize,
}

impl BatchAggregator {
    pub fn new(processor: Arc<DocumentProcessor>) -> Self {
        Self {
            processor,
            merge: Arc::new(FirstCompletedWins),
            max_concurrent: 0,
        }
    }

    /// Build an aggregator for the default pipeline.
    #[cfg(feature = "native")]
    pub fn from_config(config: &crate::models::config::MedscanConfig) -> Self {
        Self::new(Arc::new(DocumentProcessor::from_config(config)))
            .with_max_concurrent(config.batch.max_concurrent_documents)
    }

    pub fn with_merge_strategy(mut self, merge: Arc<dyn MergeStrategy>) -> Self {
        self.merge = merge;
        self
    }

    /// Bound the number of documents in flight. 0 means no bound.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Process all documents and build the request report.
    ///
    /// Per-document results are merged in completion order.
    pub async fn run(&self, documents: Vec<SubmittedDocument>) -> AnalysisReport {
        let submitted_at = Utc::now();
        let total = documents.len();
        info!("Analyzing {} documents", total);

        let limiter = if self.max_concurrent > 0 {
            Some(Arc::new(Semaphore::new(self.max_concurrent)))
        } else {
            None
        };

        let mut pending: BTreeMap<usize, String> = BTreeMap::new();
        let mut tasks = JoinSet::new();

        for (index, doc) in documents.into_iter().enumerate() {
            pending.insert(index, doc.name().to_string());
            let processor = Arc::clone(&self.processor);
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let name = doc.name().to_string();
                let uploaded_at = doc.submitted_at();
                let result = tokio::task::spawn_blocking(move || processor.process(&doc))
                    .await
                    .unwrap_or_else(|e| Err(DocumentError::Unexpected(format!("processing task failed: {}", e))));

                Completed {
                    index,
                    name,
                    uploaded_at,
                    result,
                }
            });
        }

        let mut aggregated = AggregatedMetricSet::new();
        let mut reports = Vec::with_capacity(total);
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let completed = match joined {
                Ok(completed) => completed,
                Err(e) => {
                    warn!("Document task failed: {}", e);
                    continue;
                }
            };
            pending.remove(&completed.index);

            match completed.result {
                Ok(processed) => {
                    debug!(
                        "Document {} ({}) completed with {} metric fields",
                        completed.index,
                        completed.name,
                        processed.metrics.field_count()
                    );
                    self.merge
                        .merge(&mut aggregated, completed.index, &processed.metrics);
                    reports.push(DocumentReport {
                        name: completed.name,
                        index: completed.index,
                        uploaded_at: completed.uploaded_at,
                        analyzed_at: Utc::now(),
                        extraction: processed.extraction,
                        metrics: processed.metrics,
                    });
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", completed.name, e);
                    failures.push(failure(completed.index, completed.name, &e));
                }
            }
        }

        // Tasks whose results never arrived.
        for (index, name) in pending {
            let e = DocumentError::Unexpected("processing task did not complete".to_string());
            warn!("Failed to process {}: {}", name, e);
            failures.push(failure(index, name, &e));
        }

        info!(
            "Analysis complete: {} succeeded, {} failed, {} aggregated fields",
            reports.len(),
            failures.len(),
            aggregated.metrics.field_count()
        );

        AnalysisReport {
            submitted_at,
            completed_at: Utc::now(),
            aggregated,
            documents: reports,
            failures,
        }
    }
}

fn failure(index: usize, name: String, error: &DocumentError) -> DocumentFailure {
    DocumentFailure {
        name,
        index,
        kind: error.kind(),
        message: error.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextExtractor;
    use crate::error::{ErrorKind, MedscanError};
    use crate::metrics::MetricExtractor;
    use crate::models::extraction::{ExtractionMethod, ExtractionResult};
    use crate::models::metrics::{BloodPressure, MetricSet};
    use crate::pdf::PdfTextExtractor;
    use crate::test_support;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Uses the payload itself as the extracted text.
    struct Echo(ExtractionMethod);

    impl TextExtractor for Echo {
        fn extract(&self, doc: &SubmittedDocument) -> Result<ExtractionResult, DocumentError> {
            Ok(ExtractionResult::new(
                String::from_utf8_lossy(doc.content()).into_owned(),
                self.0,
            ))
        }
    }

    fn echo_aggregator() -> BatchAggregator {
        let processor = DocumentProcessor::new(
            Arc::new(Echo(ExtractionMethod::Primary)),
            Arc::new(Echo(ExtractionMethod::Ocr)),
        );
        BatchAggregator::new(Arc::new(processor))
    }

    fn pdf(name: &str, text: &str) -> SubmittedDocument {
        SubmittedDocument::new(name, "application/pdf", text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_no_metrics_is_success_for_any_count() {
        for n in [0usize, 1, 3] {
            let docs = (0..n)
                .map(|i| pdf(&format!("note-{i}.pdf"), "Patient reports feeling well."))
                .collect();

            let report = echo_aggregator().run(docs).await;

            assert!(report.aggregated.is_empty());
            assert_eq!(report.aggregated.metrics.field_count(), 0);
            assert_eq!(report.documents.len(), n);
            assert!(report.ensure_any_succeeded().is_ok());
        }
    }

    #[tokio::test]
    async fn test_conflicting_pairs_never_mix() {
        let docs = vec![
            pdf("morning.pdf", "BP: 120/80"),
            pdf("evening.pdf", "Blood Pressure 130 over 85"),
        ];

        let report = echo_aggregator().run(docs).await;
        let bp = report.aggregated.metrics.blood_pressure;

        assert!(
            bp == Some(BloodPressure::new(120, 80)) || bp == Some(BloodPressure::new(130, 85)),
            "unexpected pair {:?}",
            bp
        );
        let source = report.aggregated.sources.blood_pressure.unwrap();
        let winner = report.documents.iter().find(|d| d.index == source).unwrap();
        assert_eq!(winner.metrics.blood_pressure, bp);
    }

    #[tokio::test]
    async fn test_unsupported_sibling_does_not_block_batch() {
        let docs = vec![
            pdf("labs.pdf", "Blood Glucose: 95 mg/dl"),
            SubmittedDocument::new("notes.txt", "text/plain", b"TSH: 9.9 mIU/L".to_vec()),
            SubmittedDocument::new("scan.jpg", "image/jpeg", b"TSH: 2.5 mIU/L".to_vec()),
        ];

        let report = echo_aggregator().run(docs).await;

        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].kind, ErrorKind::UnsupportedFormat);
        assert_eq!(report.aggregated.metrics.glucose, Some(rust_decimal::Decimal::from(95)));
        assert_eq!(
            report.aggregated.metrics.thyroid_tsh,
            Some(rust_decimal::Decimal::new(25, 1))
        );
        assert_eq!(report.aggregated.sources.thyroid_tsh, Some(2));
    }

    #[tokio::test]
    async fn test_all_failed_is_request_failure() {
        let docs = vec![
            SubmittedDocument::new("a.txt", "text/plain", b"x".to_vec()),
            SubmittedDocument::new("b.doc", "application/msword", b"y".to_vec()),
        ];

        let report = echo_aggregator().run(docs).await;

        assert!(matches!(
            report.ensure_any_succeeded(),
            Err(MedscanError::NoDocumentsProcessed { failed: 2 })
        ));
    }

    #[tokio::test]
    async fn test_bounded_concurrency_processes_everything() {
        let docs = (0..6)
            .map(|i| pdf(&format!("r{i}.pdf"), "Cholesterol: 180 mg/dl"))
            .collect();

        let report = echo_aggregator().with_max_concurrent(2).run(docs).await;

        assert_eq!(report.documents.len(), 6);
        let indexes: Vec<usize> = report
            .documents_in_submission_order()
            .iter()
            .map(|d| d.index)
            .collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(report.aggregated.metrics.cholesterol, Some(rust_decimal::Decimal::from(180)));
    }

    struct Recording(Mutex<Vec<usize>>);

    impl MergeStrategy for Recording {
        fn merge(&self, _aggregate: &mut AggregatedMetricSet, source_index: usize, _incoming: &MetricSet) {
            self.0.lock().unwrap().push(source_index);
        }
    }

    #[tokio::test]
    async fn test_custom_merge_strategy_sees_each_success_once() {
        let recording = Arc::new(Recording(Mutex::new(Vec::new())));
        let docs = vec![
            pdf("a.pdf", "BP: 110/70"),
            SubmittedDocument::new("b.txt", "text/plain", b"BP: 150/95".to_vec()),
            pdf("c.pdf", "nothing"),
        ];

        let report = echo_aggregator()
            .with_merge_strategy(recording.clone())
            .run(docs)
            .await;

        let mut seen = recording.0.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![0, 2]);
        assert!(report.aggregated.is_empty());
    }

    #[tokio::test]
    async fn test_extracted_text_reparses_identically() {
        let data = test_support::pdf(&[&["BP: 124/82", "Blood Glucose: 99 mg/dl"], &["TSH: 1.75 mIU/L"]]);
        let processor = DocumentProcessor::new(
            Arc::new(PdfTextExtractor::new()),
            Arc::new(Echo(ExtractionMethod::Ocr)),
        );
        let report = BatchAggregator::new(Arc::new(processor))
            .run(vec![SubmittedDocument::new("vitals.pdf", "application/pdf", data)])
            .await;

        let text = &report.documents[0].extraction.raw_text;
        let extractor = MetricExtractor::new();
        let first = serde_json::to_vec(&extractor.extract(text)).unwrap();
        let second = serde_json::to_vec(&extractor.extract(text)).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            report.documents[0].metrics.blood_pressure,
            Some(BloodPressure::new(124, 82))
        );
    }
}
