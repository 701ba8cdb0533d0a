//! Decoding of Climate API response rows.
//!
//! Upstream rows vary in shape: direct-model rows carry `gcm`, ensemble
//! rows carry `percentile`; values arrive as `monthVals` (12 entries),
//! `annualData` or `annualVal` (one entry); forward-looking rows add a
//! `scenario`. Rows are decoded once into the closed [`ClimateRecord`]
//! shape here, so the merger never probes raw JSON.

use serde::Deserialize;

use crate::climate::error::ClimateError;

/// Which series a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Model(String),
    Ensemble(u32),
}

/// The row's payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordValues {
    Annual(f64),
    Monthly([f64; 12]),
}

/// One decoded response row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    pub source: RecordSource,
    pub scenario: Option<String>,
    pub from_year: i32,
    pub to_year: i32,
    pub values: RecordValues,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    gcm: Option<String>,
    percentile: Option<u32>,
    scenario: Option<String>,
    #[serde(rename = "fromYear")]
    from_year: i32,
    #[serde(rename = "toYear")]
    to_year: i32,
    #[serde(rename = "annualData")]
    annual_data: Option<Vec<f64>>,
    #[serde(rename = "annualVal")]
    annual_val: Option<Vec<f64>>,
    #[serde(rename = "monthVals")]
    month_vals: Option<Vec<f64>>,
}

/// Decodes one response body into records.
///
/// Consecutive rows for the same model omit the `gcm` field after the
/// first; the last seen model carries forward, matching upstream behavior.
pub fn decode_rows(url: &str, body: &str) -> Result<Vec<ClimateRecord>, ClimateError> {
    let raw: Vec<RawRow> = serde_json::from_str(body).map_err(|source| ClimateError::RowDecode {
        url: url.to_string(),
        source,
    })?;

    let mut records = Vec::with_capacity(raw.len());
    let mut last_model: Option<String> = None;

    for row in raw {
        let source = if let Some(percentile) = row.percentile {
            RecordSource::Ensemble(percentile)
        } else {
            let model = row.gcm.or_else(|| last_model.clone()).ok_or_else(|| {
                ClimateError::UnexpectedRow {
                    url: url.to_string(),
                    detail: "row carries neither 'gcm' nor 'percentile'".to_string(),
                }
            })?;
            last_model = Some(model.clone());
            RecordSource::Model(model)
        };

        let values = decode_values(url, row.month_vals, row.annual_data, row.annual_val)?;

        records.push(ClimateRecord {
            source,
            scenario: row.scenario,
            from_year: row.from_year,
            to_year: row.to_year,
            values,
        });
    }

    Ok(records)
}

fn decode_values(
    url: &str,
    month_vals: Option<Vec<f64>>,
    annual_data: Option<Vec<f64>>,
    annual_val: Option<Vec<f64>>,
) -> Result<RecordValues, ClimateError> {
    if let Some(months) = month_vals {
        let months: [f64; 12] =
            months
                .try_into()
                .map_err(|bad: Vec<f64>| ClimateError::UnexpectedRow {
                    url: url.to_string(),
                    detail: format!("'monthVals' has {} entries, expected 12", bad.len()),
                })?;
        return Ok(RecordValues::Monthly(months));
    }

    let annual = annual_data.or(annual_val).and_then(|v| v.first().copied());
    match annual {
        Some(value) => Ok(RecordValues::Annual(value)),
        None => Err(ClimateError::UnexpectedRow {
            url: url.to_string(),
            detail: "row carries no 'monthVals', 'annualData' or 'annualVal'".to_string(),
        }),
    }
}
