//! Caller-facing view of a country-indicators query.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::types::date::{parse_period, InvalidPeriod};

/// Values keyed indicator -> country -> period string. A present key with a
/// `None` value means the API reported the period with no data.
pub type IndicatorData = BTreeMap<String, BTreeMap<String, BTreeMap<String, Option<f64>>>>;

/// The result of a country-indicators query: values plus the display names
/// the response carried for each indicator and country.
#[derive(Debug, Clone, Default)]
pub struct IndicatorDataset {
    data: IndicatorData,
    indicators: BTreeMap<String, String>,
    countries: BTreeMap<String, String>,
}

impl IndicatorDataset {
    pub(crate) fn new(
        data: IndicatorData,
        indicators: BTreeMap<String, String>,
        countries: BTreeMap<String, String>,
    ) -> Self {
        Self {
            data,
            indicators,
            countries,
        }
    }

    pub fn as_dict(&self) -> &IndicatorData {
        &self.data
    }

    /// Indicator code -> display name.
    pub fn indicators(&self) -> &BTreeMap<String, String> {
        &self.indicators
    }

    /// Country code -> display name.
    pub fn countries(&self) -> &BTreeMap<String, String> {
        &self.countries
    }

    /// Every period string with data, across all series, sorted ascending.
    pub fn dates(&self) -> Vec<String> {
        let mut dates = BTreeSet::new();
        for by_country in self.data.values() {
            for series in by_country.values() {
                dates.extend(series.keys().cloned());
            }
        }
        dates.into_iter().collect()
    }

    /// The same periods as calendar dates.
    pub fn dates_as_datetime(&self) -> Result<Vec<NaiveDate>, InvalidPeriod> {
        self.dates().iter().map(|d| parse_period(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndicatorDataset {
        let mut series = BTreeMap::new();
        series.insert("2010".to_string(), Some(62.8));
        series.insert("2011Q1".to_string(), None);
        let mut by_country = BTreeMap::new();
        by_country.insert("GB".to_string(), series);
        let mut data = BTreeMap::new();
        data.insert("SP.POP.TOTL".to_string(), by_country);

        let mut indicators = BTreeMap::new();
        indicators.insert("SP.POP.TOTL".to_string(), "Population, total".to_string());
        let mut countries = BTreeMap::new();
        countries.insert("GB".to_string(), "United Kingdom".to_string());

        IndicatorDataset::new(data, indicators, countries)
    }

    #[test]
    fn dates_union_all_series() {
        let dataset = sample();
        assert_eq!(dataset.dates(), vec!["2010".to_string(), "2011Q1".to_string()]);
    }

    #[test]
    fn dates_convert_through_the_period_grammar() {
        let dataset = sample();
        assert_eq!(
            dataset.dates_as_datetime().unwrap(),
            vec![
                NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            ]
        );
    }
}
