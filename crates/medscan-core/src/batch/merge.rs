//! Policies for folding per-document metrics into the aggregate.

use tracing::trace;

use crate::models::metrics::{AggregatedMetricSet, MetricSet, MetricValue};

/// Folds one document's metrics into the request aggregate.
///
/// Called once per successful document, in completion order.
pub trait MergeStrategy: Send + Sync {
    fn merge(&self, aggregate: &mut AggregatedMetricSet, source_index: usize, incoming: &MetricSet);
}

/// Each field keeps the first present value to arrive.
///
/// Documents are merged as they finish, so when two documents report different
/// values for the same field the winner depends on scheduling and is not
/// deterministic. Blood pressure is merged as one pair, so systolic and
/// diastolic always come from the same document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCompletedWins;

impl MergeStrategy for FirstCompletedWins {
    fn merge(&self, aggregate: &mut AggregatedMetricSet, source_index: usize, incoming: &MetricSet) {
        for value in incoming.values() {
            if aggregate.metrics.set_if_absent(value) {
                let slot = match value {
                    MetricValue::BloodPressure(_) => &mut aggregate.sources.blood_pressure,
                    MetricValue::Glucose(_) => &mut aggregate.sources.glucose,
                    MetricValue::Cholesterol(_) => &mut aggregate.sources.cholesterol,
                    MetricValue::ThyroidTsh(_) => &mut aggregate.sources.thyroid_tsh,
                };
                *slot = Some(source_index);
            } else {
                trace!("Ignoring {:?} from document {}: already set", value, source_index);
            }
        }
    }
}
