//! Blood pressure extraction.

use tracing::trace;

use super::patterns::BLOOD_PRESSURE_PATTERNS;
use super::{ExtractionMatch, FieldExtractor, MetricFamily, MetricRule, PatternRule, capture, first_match};
use crate::error::RuleError;
use crate::models::metrics::{BloodPressure, MetricValue};

/// Extracts a systolic/diastolic pair from a single match.
pub struct BloodPressureExtractor {
    patterns: &'static [PatternRule],
}

impl BloodPressureExtractor {
    pub fn new() -> Self {
        Self {
            patterns: BLOOD_PRESSURE_PATTERNS.as_slice(),
        }
    }

    /// Use a different ordered pattern list. Each pattern needs two capture groups.
    pub fn with_patterns(patterns: &'static [PatternRule]) -> Self {
        Self { patterns }
    }
}

impl Default for BloodPressureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BloodPressureExtractor {
    type Output = BloodPressure;

    fn extract(&self, text: &str) -> Result<Option<ExtractionMatch<BloodPressure>>, RuleError> {
        let Some((rule, caps)) = first_match(self.patterns, text) else {
            return Ok(None);
        };

        let family = MetricFamily::BloodPressure;
        let systolic = parse_pressure(capture(&caps, 1, family)?)?;
        let diastolic = parse_pressure(capture(&caps, 2, family)?)?;

        trace!("{} matched: {}/{}", rule.label, systolic, diastolic);

        Ok(Some(ExtractionMatch::from_captures(
            BloodPressure::new(systolic, diastolic),
            rule,
            &caps,
        )))
    }
}

impl MetricRule for BloodPressureExtractor {
    fn family(&self) -> MetricFamily {
        MetricFamily::BloodPressure
    }

    fn extract_value(&self, text: &str) -> Result<Option<MetricValue>, RuleError> {
        Ok(self
            .extract(text)?
            .map(|m| MetricValue::BloodPressure(m.value)))
    }
}

fn parse_pressure(s: &str) -> Result<u16, RuleError> {
    s.parse().map_err(|_| RuleError::Parse {
        family: MetricFamily::BloodPressure.name(),
        value: s.to_string(),
    })
}
