//! Key and value types for merged climate datasets.

use chrono::NaiveDate;
use std::fmt;

use crate::types::date::year_start;

/// Identifies the series a value belongs to: a literal GCM, or a synthetic
/// ensemble statistic at a given percentile.
///
/// Two keys are equal only if both the representation and the percentile
/// (when present) match; `Gcm("ensemble_50")` and `Ensemble(50)` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelKey {
    /// A named global circulation model, e.g. `bccr_bcm2_0`.
    Gcm(String),
    /// The cross-model ensemble at the 10th, 50th or 90th percentile.
    Ensemble(u32),
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKey::Gcm(name) => write!(f, "{name}"),
            ModelKey::Ensemble(percentile) => write!(f, "ensemble_{percentile}"),
        }
    }
}

/// The time axis of a merged value.
///
/// Historical (control period) values carry a bare year; forward-looking
/// modelled values additionally carry the emissions scenario they were
/// simulated under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeKey {
    Year(i32),
    Scenario { year: i32, scenario: String },
}

impl TimeKey {
    pub fn year(&self) -> i32 {
        match self {
            TimeKey::Year(year) => *year,
            TimeKey::Scenario { year, .. } => *year,
        }
    }

    /// The scenario tag, if this is a forward-looking key.
    pub fn scenario(&self) -> Option<&str> {
        match self {
            TimeKey::Year(_) => None,
            TimeKey::Scenario { scenario, .. } => Some(scenario),
        }
    }

    /// January 1st of the key's year, when representable.
    pub fn as_date(&self) -> Option<NaiveDate> {
        year_start(self.year())
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKey::Year(year) => write!(f, "{year}"),
            TimeKey::Scenario { year, scenario } => write!(f, "{year}/{scenario}"),
        }
    }
}

/// Twelve monthly values, exposed with 1-indexed calendar months.
///
/// The upstream API numbers months 0-11; this crate corrects that to the
/// conventional 1-12 on every caller-facing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySeries([f64; 12]);

impl MonthlySeries {
    pub fn new(values: [f64; 12]) -> Self {
        Self(values)
    }

    /// The value for a calendar month in `1..=12`.
    pub fn month(&self, month: u32) -> Option<f64> {
        if (1..=12).contains(&month) {
            Some(self.0[(month - 1) as usize])
        } else {
            None
        }
    }

    /// Iterates `(month, value)` pairs with months numbered 1-12.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().enumerate().map(|(i, v)| (i as u32 + 1, *v))
    }

    pub fn values(&self) -> &[f64; 12] {
        &self.0
    }
}

impl From<[f64; 12]> for MonthlySeries {
    fn from(values: [f64; 12]) -> Self {
        Self(values)
    }
}

/// A merged value: one scalar for annual records, a 12-month series for
/// monthly records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataValue {
    Annual(f64),
    Monthly(MonthlySeries),
}

impl DataValue {
    pub fn as_annual(&self) -> Option<f64> {
        match self {
            DataValue::Annual(v) => Some(*v),
            DataValue::Monthly(_) => None,
        }
    }

    pub fn as_monthly(&self) -> Option<&MonthlySeries> {
        match self {
            DataValue::Annual(_) => None,
            DataValue::Monthly(series) => Some(series),
        }
    }
}
