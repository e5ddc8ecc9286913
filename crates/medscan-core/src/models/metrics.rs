//! Clinical metric models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A systolic/diastolic pair taken from a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BloodPressure {
    pub fn new(systolic: u16, diastolic: u16) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

impl std::fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} mmHg", self.systolic, self.diastolic)
    }
}

/// One value contributed by a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    BloodPressure(BloodPressure),
    Glucose(Decimal),
    Cholesterol(Decimal),
    ThyroidTsh(Decimal),
}

/// Structured metrics extracted from one document.
///
/// Systolic and diastolic pressure live in one [`BloodPressure`] so they are
/// always set together. Serializes as five flat optional fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MetricRecord", into = "MetricRecord")]
pub struct MetricSet {
    pub blood_pressure: Option<BloodPressure>,
    pub glucose: Option<Decimal>,
    pub cholesterol: Option<Decimal>,
    pub thyroid_tsh: Option<Decimal>,
}

impl MetricSet {
    pub fn systolic(&self) -> Option<u16> {
        self.blood_pressure.map(|bp| bp.systolic)
    }

    pub fn diastolic(&self) -> Option<u16> {
        self.blood_pressure.map(|bp| bp.diastolic)
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_none()
            && self.glucose.is_none()
            && self.cholesterol.is_none()
            && self.thyroid_tsh.is_none()
    }

    /// Number of the five persisted fields that are set.
    pub fn field_count(&self) -> usize {
        let bp = if self.blood_pressure.is_some() { 2 } else { 0 };
        bp + [self.glucose, self.cholesterol, self.thyroid_tsh]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }

    /// Store a value only if its field is still unset. Returns whether it was stored.
    pub fn set_if_absent(&mut self, value: MetricValue) -> bool {
        let absent = match value {
            MetricValue::BloodPressure(_) => self.blood_pressure.is_none(),
            MetricValue::Glucose(_) => self.glucose.is_none(),
            MetricValue::Cholesterol(_) => self.cholesterol.is_none(),
            MetricValue::ThyroidTsh(_) => self.thyroid_tsh.is_none(),
        };
        if absent {
            self.set(value);
        }
        absent
    }

    /// Present fields as individual values.
    pub fn values(&self) -> Vec<MetricValue> {
        let mut values = Vec::with_capacity(4);
        if let Some(bp) = self.blood_pressure {
            values.push(MetricValue::BloodPressure(bp));
        }
        if let Some(v) = self.glucose {
            values.push(MetricValue::Glucose(v));
        }
        if let Some(v) = self.cholesterol {
            values.push(MetricValue::Cholesterol(v));
        }
        if let Some(v) = self.thyroid_tsh {
            values.push(MetricValue::ThyroidTsh(v));
        }
        values
    }

    /// Store a value, replacing whatever the field held.
    pub fn set(&mut self, value: MetricValue) {
        match value {
            MetricValue::BloodPressure(bp) => self.blood_pressure = Some(bp),
            MetricValue::Glucose(v) => self.glucose = Some(v),
            MetricValue::Cholesterol(v) => self.cholesterol = Some(v),
            MetricValue::ThyroidTsh(v) => self.thyroid_tsh = Some(v),
        }
    }
}

/// Flat persistence shape of a [`MetricSet`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct MetricRecord {
    bp_systolic: Option<u16>,
    bp_diastolic: Option<u16>,
    glucose: Option<Decimal>,
    cholesterol: Option<Decimal>,
    thyroid_tsh: Option<Decimal>,
}

impl From<MetricSet> for MetricRecord {
    fn from(set: MetricSet) -> Self {
        Self {
            bp_systolic: set.systolic(),
            bp_diastolic: set.diastolic(),
            glucose: set.glucose,
            cholesterol: set.cholesterol,
            thyroid_tsh: set.thyroid_tsh,
        }
    }
}

impl From<MetricRecord> for MetricSet {
    fn from(record: MetricRecord) -> Self {
        let blood_pressure = match (record.bp_systolic, record.bp_diastolic) {
            (Some(systolic), Some(diastolic)) => Some(BloodPressure::new(systolic, diastolic)),
            _ => None,
        };
        Self {
            blood_pressure,
            glucose: record.glucose,
            cholesterol: record.cholesterol,
            thyroid_tsh: record.thyroid_tsh,
        }
    }
}

/// Submission index of the document that supplied each aggregated field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thyroid_tsh: Option<usize>,
}

/// Metrics merged across every document of one analysis request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedMetricSet {
    #[serde(flatten)]
    pub metrics: MetricSet,
    pub sources: MetricSources,
}

impl AggregatedMetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
