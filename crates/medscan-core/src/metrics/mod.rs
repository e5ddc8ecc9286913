//! Clinical metric extraction from raw document text.

pub mod rules;

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::models::metrics::MetricSet;
use rules::{BloodPressureExtractor, ConcentrationExtractor, MetricFamily, MetricRule};

/// Runs every metric family over a text and collects the results.
///
/// Never fails: a family that errors or panics is logged and left unset while
/// the remaining families still run. Pure given its input text.
pub struct MetricExtractor {
    rules: Vec<Box<dyn MetricRule>>,
}

impl MetricExtractor {
    /// Create an extractor with the default families: blood pressure, glucose,
    /// cholesterol and TSH.
    pub fn new() -> Self {
        Self::with_rules(vec![
            Box::new(BloodPressureExtractor::new()),
            Box::new(ConcentrationExtractor::glucose()),
            Box::new(ConcentrationExtractor::cholesterol()),
            Box::new(ConcentrationExtractor::thyroid_tsh()),
        ])
    }

    /// Create an extractor from custom rules. When two rules share a family the
    /// earlier one takes precedence.
    pub fn with_rules(rules: Vec<Box<dyn MetricRule>>) -> Self {
        Self { rules }
    }

    /// Families in evaluation order.
    pub fn families(&self) -> Vec<MetricFamily> {
        self.rules.iter().map(|r| r.family()).collect()
    }

    /// Extract all metrics from the text.
    pub fn extract(&self, text: &str) -> MetricSet {
        let mut metrics = MetricSet::default();

        for rule in &self.rules {
            let family = rule.family();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.extract_value(text)));

            match outcome {
                Ok(Ok(Some(value))) => {
                    if !metrics.set_if_absent(value) {
                        trace!("{} already set by an earlier rule", family);
                    }
                }
                Ok(Ok(None)) => trace!("no {} found", family),
                Ok(Err(e)) => warn!("{} extraction failed: {}", family, e),
                Err(_) => warn!("{} extraction panicked", family),
            }
        }

        debug!("Extracted {} metric fields", metrics.field_count());
        metrics
    }
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new()
    }
}
