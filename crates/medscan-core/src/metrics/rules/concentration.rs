//! Decimal lab values with a unit: glucose, cholesterol and TSH.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::{CHOLESTEROL_PATTERNS, GLUCOSE_PATTERNS, THYROID_PATTERNS};
use super::{ExtractionMatch, FieldExtractor, MetricFamily, MetricRule, PatternRule, capture, first_match};
use crate::error::RuleError;
use crate::models::metrics::MetricValue;

/// Extracts one decimal value using an ordered list of unit-variant patterns.
///
/// The raw number is kept whichever unit matched; no conversion is applied.
pub struct ConcentrationExtractor {
    family: MetricFamily,
    patterns: &'static [PatternRule],
}

impl ConcentrationExtractor {
    /// Blood glucose (mg/dL, then mmol/L).
    pub fn glucose() -> Self {
        Self::with_patterns(MetricFamily::Glucose, GLUCOSE_PATTERNS.as_slice())
    }

    /// Total cholesterol (mg/dL, then mmol/L).
    pub fn cholesterol() -> Self {
        Self::with_patterns(MetricFamily::Cholesterol, CHOLESTEROL_PATTERNS.as_slice())
    }

    /// Thyroid stimulating hormone (mIU/L, then ng/mL).
    pub fn thyroid_tsh() -> Self {
        Self::with_patterns(MetricFamily::ThyroidTsh, THYROID_PATTERNS.as_slice())
    }

    /// Custom family and pattern list. The value must be capture group 1.
    pub fn with_patterns(family: MetricFamily, patterns: &'static [PatternRule]) -> Self {
        Self { family, patterns }
    }
}

impl FieldExtractor for ConcentrationExtractor {
    type Output = Decimal;

    fn extract(&self, text: &str) -> Result<Option<ExtractionMatch<Decimal>>, RuleError> {
        let Some((rule, caps)) = first_match(self.patterns, text) else {
            return Ok(None);
        };

        let raw = capture(&caps, 1, self.family)?;
        let value = Decimal::from_str(raw).map_err(|_| RuleError::Parse {
            family: self.family.name(),
            value: raw.to_string(),
        })?;

        trace!(
            "{} matched: {} {}",
            rule.label,
            value,
            rule.unit.map(|u| u.to_string()).unwrap_or_default()
        );

        Ok(Some(ExtractionMatch::from_captures(value, rule, &caps)))
    }
}

impl MetricRule for ConcentrationExtractor {
    fn family(&self) -> MetricFamily {
        self.family
    }

    fn extract_value(&self, text: &str) -> Result<Option<MetricValue>, RuleError> {
        let Some(m) = self.extract(text)? else {
            return Ok(None);
        };
        let value = match self.family {
            MetricFamily::Glucose => MetricValue::Glucose(m.value),
            MetricFamily::Cholesterol => MetricValue::Cholesterol(m.value),
            MetricFamily::ThyroidTsh => MetricValue::ThyroidTsh(m.value),
            MetricFamily::BloodPressure => {
                return Err(RuleError::Parse {
                    family: self.family.name(),
                    value: m.source,
                });
            }
        };
        Ok(Some(value))
    }
}
