//! Ordered regex patterns for clinical metric extraction.
//!
//! Each list is tried top to bottom and the first pattern that matches wins.
//! Units are recorded on the match but values are never converted.

use lazy_static::lazy_static;
use regex::Regex;

use super::{PatternRule, Unit};

lazy_static! {
    // Blood pressure: one systolic/diastolic pair, three phrasings
    pub static ref BLOOD_PRESSURE_PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            "bp_slash",
            None,
            Regex::new(r"(?i)(?:BP|Blood\s+Pressure)\s*:?\s*(\d{2,3})\s*/\s*(\d{2,3})").unwrap(),
        ),
        PatternRule::new(
            "bp_over",
            None,
            Regex::new(r"(?i)(?:BP|Blood\s+Pressure)\s*:?\s*(\d{2,3})\s*over\s*(\d{2,3})").unwrap(),
        ),
        PatternRule::new(
            "bp_dash",
            None,
            Regex::new(r"(?i)(?:BP|Blood\s+Pressure)\s*:?\s*(\d{2,3})\s*[-–]\s*(\d{2,3})").unwrap(),
        ),
    ];

    // Blood glucose (fasting or random)
    pub static ref GLUCOSE_PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            "glucose_mg_dl",
            Some(Unit::MgPerDl),
            Regex::new(
                r"(?i)(?:Blood\s+Glucose|Blood\s+Sugar|FBS|Fasting\s+Blood\s+Sugar)\s*:?\s*(\d{2,3}(?:\.\d{1,2})?)\s*mg\s*/\s*dl"
            ).unwrap(),
        ),
        PatternRule::new(
            "glucose_mmol_l",
            Some(Unit::MmolPerL),
            Regex::new(
                r"(?i)(?:Blood\s+Glucose|Blood\s+Sugar|FBS|Fasting\s+Blood\s+Sugar)\s*:?\s*(\d{1,3}(?:\.\d{1,2})?)\s*mmol\s*/\s*l"
            ).unwrap(),
        ),
    ];

    // Total cholesterol
    pub static ref CHOLESTEROL_PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            "cholesterol_mg_dl",
            Some(Unit::MgPerDl),
            Regex::new(
                r"(?i)(?:Total\s+Cholesterol|Cholesterol)\s*:?\s*(\d{2,3}(?:\.\d{1,2})?)\s*mg\s*/\s*dl"
            ).unwrap(),
        ),
        PatternRule::new(
            "cholesterol_mmol_l",
            Some(Unit::MmolPerL),
            Regex::new(
                r"(?i)(?:Total\s+Cholesterol|Cholesterol)\s*:?\s*(\d{1,3}(?:\.\d{1,2})?)\s*mmol\s*/\s*l"
            ).unwrap(),
        ),
    ];

    // Thyroid stimulating hormone
    pub static ref THYROID_PATTERNS: Vec<PatternRule> = vec![
        PatternRule::new(
            "tsh_miu_l",
            Some(Unit::MiuPerL),
            Regex::new(
                r"(?i)(?:TSH|Thyroid\s+Stimulating\s+Hormone)\s*:?\s*(\d+(?:\.\d{1,3})?)\s*(?:mIU\s*/\s*L|[μµ]IU\s*/\s*ml)"
            ).unwrap(),
        ),
        PatternRule::new(
            "tsh_ng_ml",
            Some(Unit::NgPerMl),
            Regex::new(
                r"(?i)(?:TSH|Thyroid\s+Stimulating\s+Hormone)\s*:?\s*(\d+(?:\.\d{1,3})?)\s*ng\s*/\s*ml"
            ).unwrap(),
        ),
    ];
}
