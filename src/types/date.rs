//! Parsing of World Bank period strings into calendar dates.
//!
//! Every period-to-date conversion in the crate goes through this module, so
//! the upstream date grammar (`2010`, `2010Q3`, `2010M06`) is handled in one
//! place.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid World Bank period string: {0:?}")]
pub struct InvalidPeriod(pub String);

/// Converts a World Bank period string to a `NaiveDate`.
///
/// Quarters map to the first month of the quarter, month periods to the
/// first day of that month, and bare years to January 1st.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wbapi::parse_period;
///
/// assert_eq!(parse_period("2010").unwrap(), NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
/// assert_eq!(parse_period("2010Q3").unwrap(), NaiveDate::from_ymd_opt(2010, 7, 1).unwrap());
/// assert_eq!(parse_period("2010M06").unwrap(), NaiveDate::from_ymd_opt(2010, 6, 1).unwrap());
/// ```
pub fn parse_period(period: &str) -> Result<NaiveDate, InvalidPeriod> {
    let invalid = || InvalidPeriod(period.to_string());

    if let Some((year, quarter)) = period.split_once('Q') {
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u32 = quarter.parse().map_err(|_| invalid())?;
        if !(1..=4).contains(&quarter) {
            return Err(invalid());
        }
        return NaiveDate::from_ymd_opt(year, quarter * 3 - 2, 1).ok_or_else(invalid);
    }

    if let Some((year, month)) = period.split_once('M') {
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        return NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid);
    }

    let year: i32 = period.parse().map_err(|_| invalid())?;
    year_start(year).ok_or_else(invalid)
}

/// January 1st of the given year, when representable.
pub fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
