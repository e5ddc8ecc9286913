//! Rule-based extractors for clinical metrics.

pub mod blood_pressure;
pub mod concentration;
pub mod patterns;

pub use blood_pressure::BloodPressureExtractor;
pub use concentration::ConcentrationExtractor;
pub use patterns::*;

use regex::{Captures, Regex};

use crate::error::RuleError;
use crate::models::metrics::MetricValue;

/// Metric family handled by one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    BloodPressure,
    Glucose,
    Cholesterol,
    ThyroidTsh,
}

impl MetricFamily {
    pub fn name(&self) -> &'static str {
        match self {
            MetricFamily::BloodPressure => "blood_pressure",
            MetricFamily::Glucose => "glucose",
            MetricFamily::Cholesterol => "cholesterol",
            MetricFamily::ThyroidTsh => "thyroid_tsh",
        }
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit a pattern matched on. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    MgPerDl,
    MmolPerL,
    MiuPerL,
    NgPerMl,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::MgPerDl => write!(f, "mg/dL"),
            Unit::MmolPerL => write!(f, "mmol/L"),
            Unit::MiuPerL => write!(f, "mIU/L"),
            Unit::NgPerMl => write!(f, "ng/mL"),
        }
    }
}

/// One entry of an ordered pattern list.
#[derive(Debug)]
pub struct PatternRule {
    /// Stable name, used in logs and tests.
    pub label: &'static str,
    /// Unit the pattern requires, if any.
    pub unit: Option<Unit>,
    pub regex: Regex,
}

impl PatternRule {
    pub fn new(label: &'static str, unit: Option<Unit>, regex: Regex) -> Self {
        Self { label, unit, regex }
    }
}

/// Try each pattern in order and return the first that matches.
pub fn first_match<'p, 't>(
    patterns: &'p [PatternRule],
    text: &'t str,
) -> Option<(&'p PatternRule, Captures<'t>)> {
    patterns
        .iter()
        .find_map(|rule| rule.regex.captures(text).map(|caps| (rule, caps)))
}

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text using the first matching pattern.
    fn extract(&self, text: &str) -> Result<Option<ExtractionMatch<Self::Output>>, RuleError>;
}

/// A metric family as seen by [`crate::metrics::MetricExtractor`].
///
/// Rules return a value instead of writing into shared state, so a failing
/// rule cannot disturb the fields of another family.
pub trait MetricRule: Send + Sync {
    /// Family this rule fills.
    fn family(&self) -> MetricFamily;

    /// Find this family's value in the text.
    fn extract_value(&self, text: &str) -> Result<Option<MetricValue>, RuleError>;
}

/// A matched value with where it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Label of the pattern that matched.
    pub pattern: &'static str,
    /// Unit the pattern matched on.
    pub unit: Option<Unit>,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern,
            unit: None,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_unit(mut self, unit: Option<Unit>) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Build a match from the whole-pattern capture.
    pub(crate) fn from_captures(value: T, rule: &PatternRule, caps: &Captures<'_>) -> Self {
        let matched = ExtractionMatch::new(value, rule.label, "").with_unit(rule.unit);
        match caps.get(0) {
            Some(m) => ExtractionMatch {
                source: m.as_str().to_string(),
                ..matched
            }
            .with_position(m.start(), m.end()),
            None => matched,
        }
    }
}

/// Text of capture group `group`, or a rule error naming the family.
pub(crate) fn capture<'t>(
    caps: &Captures<'t>,
    group: usize,
    family: MetricFamily,
) -> Result<&'t str, RuleError> {
    caps.get(group)
        .map(|m| m.as_str())
        .ok_or(RuleError::MissingCapture {
            family: family.name(),
            group,
        })
}
