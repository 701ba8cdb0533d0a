//! Caller-facing dataset views.
//!
//! Both dataset types are plain immutable containers: the client builds
//! them once from fetched responses, and every filter or conversion here
//! returns a fresh structure instead of mutating state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::climate::merge::{DataMap, MergedDataset};
use crate::climate::plan::{DataType, Variable};
use crate::types::date::year_start;
use crate::types::keys::{ModelKey, TimeKey};

/// Resolution of an instrumental (observed) series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Year,
    Month,
    Decade,
}

impl Interval {
    /// The segment embedded in instrumental request URLs.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::Year => "year",
            Interval::Month => "month",
            Interval::Decade => "decade",
        }
    }
}

/// A modelled (GCM-simulated) result set.
///
/// Wraps the merged fan-out together with the logical call's parameters,
/// so a caller can always recover what was asked for.
#[derive(Debug, Clone)]
pub struct ModelledDataset {
    merged: MergedDataset,
    data_type: DataType,
    variable: Variable,
}

impl ModelledDataset {
    pub(crate) fn new(merged: MergedDataset, data_type: DataType, variable: Variable) -> Self {
        Self {
            merged,
            data_type,
            variable,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// The full merged map, every scenario included.
    pub fn as_dict(&self) -> &DataMap {
        self.merged.data()
    }

    /// A view restricted to one emissions scenario.
    ///
    /// Historical entries carry no scenario and are always kept; scenario
    /// entries matching `scenario` collapse to bare-year keys, so the
    /// result reads as a single continuous timeline.
    pub fn for_scenario(&self, scenario: &str) -> DataMap {
        let mut filtered = DataMap::new();
        for (model, by_location) in self.merged.data() {
            for (location, by_time) in by_location {
                for (time, value) in by_time {
                    let keep = match time.scenario() {
                        None => true,
                        Some(tag) => tag.eq_ignore_ascii_case(scenario),
                    };
                    if keep {
                        // Collapsing scenario keys to bare years can collide
                        // with a historical entry for the same year; first
                        // write wins, matching the merge.
                        filtered
                            .entry(model.clone())
                            .or_default()
                            .entry(location.clone())
                            .or_default()
                            .entry(TimeKey::Year(time.year()))
                            .or_insert(*value);
                    }
                }
            }
        }
        filtered
    }

    /// Every `(start, end)` window with data, sorted ascending.
    pub fn dates(&self) -> Vec<(i32, i32)> {
        self.merged.windows().iter().copied().collect()
    }

    /// Window end years as calendar dates, for plotting against a time axis.
    pub fn dates_as_datetime(&self) -> Vec<NaiveDate> {
        self.merged
            .windows()
            .iter()
            .filter_map(|(_, end)| year_start(*end))
            .collect()
    }

    /// The scenarios present in the data.
    pub fn scenarios(&self) -> &BTreeSet<String> {
        self.merged.scenarios()
    }

    /// The model keys present in the data.
    pub fn gcms(&self) -> Vec<ModelKey> {
        self.merged.models().cloned().collect()
    }
}

/// Time key of an instrumental series value.
///
/// Monthly series are climatological normals rather than a calendar
/// timeline, so the key is the month number alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HistoricalKey {
    /// A calendar year, also used for the starting year of a decade.
    Year(i32),
    /// A calendar month in `1..=12`.
    Month(u32),
}

impl HistoricalKey {
    /// A calendar-date rendering for time-axis plotting. Month keys are
    /// anchored to an arbitrary fixed non-leap year.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            HistoricalKey::Year(year) => year_start(*year),
            HistoricalKey::Month(month) => NaiveDate::from_ymd_opt(2009, *month, 1),
        }
    }
}

/// An instrumental (observed, station-derived) result set.
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    interval: Interval,
    data: BTreeMap<String, BTreeMap<HistoricalKey, f64>>,
}

impl HistoricalDataset {
    pub(crate) fn new(
        interval: Interval,
        data: BTreeMap<String, BTreeMap<HistoricalKey, f64>>,
    ) -> Self {
        Self { interval, data }
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Values keyed by location, then time.
    pub fn as_dict(&self) -> &BTreeMap<String, BTreeMap<HistoricalKey, f64>> {
        &self.data
    }

    /// Every time key with data, sorted ascending.
    pub fn dates(&self) -> Vec<HistoricalKey> {
        let mut keys: BTreeSet<HistoricalKey> = BTreeSet::new();
        for series in self.data.values() {
            keys.extend(series.keys().copied());
        }
        keys.into_iter().collect()
    }

    /// Time keys as calendar dates.
    pub fn dates_as_datetime(&self) -> Vec<NaiveDate> {
        self.dates().iter().filter_map(HistoricalKey::as_date).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::merge::Fragment;
    use crate::climate::record::{ClimateRecord, RecordSource, RecordValues};
    use crate::types::keys::DataValue;

    fn modelled_sample() -> ModelledDataset {
        let record = |scenario: Option<&str>, window: (i32, i32), value: f64| ClimateRecord {
            source: RecordSource::Model("cnrm_cm3".into()),
            scenario: scenario.map(str::to_string),
            from_year: window.0,
            to_year: window.1,
            values: RecordValues::Annual(value),
        };
        let merged = MergedDataset::from_fragments([Fragment::new(
            "http://t.invalid/v1/country/annualavg/pr/1920/2099/GBR.json".into(),
            vec![
                record(None, (1920, 1939), 1.0),
                record(Some("a2"), (2020, 2039), 2.0),
                record(Some("b1"), (2020, 2039), 3.0),
            ],
        )]);
        ModelledDataset::new(merged, DataType::AnnualAverage, Variable::Precipitation)
    }

    #[test]
    fn scenario_view_keeps_historical_and_collapses_keys() {
        let dataset = modelled_sample();
        let a2 = dataset.for_scenario("a2");
        let series = &a2[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];

        assert_eq!(series[&TimeKey::Year(1939)], DataValue::Annual(1.0));
        assert_eq!(series[&TimeKey::Year(2039)], DataValue::Annual(2.0));
        assert_eq!(series.len(), 2);

        let b1 = dataset.for_scenario("b1");
        let series = &b1[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];
        assert_eq!(series[&TimeKey::Year(2039)], DataValue::Annual(3.0));
    }

    #[test]
    fn scenario_view_keeps_the_historical_value_on_a_year_collision() {
        let record = |scenario: Option<&str>, value: f64| ClimateRecord {
            source: RecordSource::Model("cnrm_cm3".into()),
            scenario: scenario.map(str::to_string),
            from_year: 2020,
            to_year: 2039,
            values: RecordValues::Annual(value),
        };
        // A bare-year entry and a scenario entry for the same end year.
        let merged = MergedDataset::from_fragments([Fragment::new(
            "http://t.invalid/v1/country/annualavg/pr/2020/2039/GBR.json".into(),
            vec![record(None, 1.0), record(Some("a2"), 2.0)],
        )]);
        let dataset =
            ModelledDataset::new(merged, DataType::AnnualAverage, Variable::Precipitation);

        let a2 = dataset.for_scenario("a2");
        let series = &a2[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];
        assert_eq!(series[&TimeKey::Year(2039)], DataValue::Annual(1.0));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn scenario_view_does_not_mutate_the_dataset() {
        let dataset = modelled_sample();
        let _ = dataset.for_scenario("a2");
        assert_eq!(
            dataset.scenarios().iter().cloned().collect::<Vec<_>>(),
            vec!["a2".to_string(), "b1".to_string()]
        );
        assert_eq!(dataset.dates(), vec![(1920, 1939), (2020, 2039)]);
    }

    #[test]
    fn modelled_dates_render_as_window_end_years() {
        let dataset = modelled_sample();
        assert_eq!(
            dataset.dates_as_datetime(),
            vec![
                NaiveDate::from_ymd_opt(1939, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2039, 1, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn historical_month_keys_anchor_to_a_fixed_year() {
        let mut series = BTreeMap::new();
        series.insert(HistoricalKey::Month(1), 5.2);
        series.insert(HistoricalKey::Month(12), 4.8);
        let mut data = BTreeMap::new();
        data.insert("GB".to_string(), series);

        let dataset = HistoricalDataset::new(Interval::Month, data);
        assert_eq!(
            dataset.dates(),
            vec![HistoricalKey::Month(1), HistoricalKey::Month(12)]
        );
        assert_eq!(
            dataset.dates_as_datetime(),
            vec![
                NaiveDate::from_ymd_opt(2009, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2009, 12, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn historical_dates_union_all_locations() {
        let mut gb = BTreeMap::new();
        gb.insert(HistoricalKey::Year(1901), 1.0);
        let mut fr = BTreeMap::new();
        fr.insert(HistoricalKey::Year(1902), 2.0);
        let mut data = BTreeMap::new();
        data.insert("GB".to_string(), gb);
        data.insert("FR".to_string(), fr);

        let dataset = HistoricalDataset::new(Interval::Year, data);
        assert_eq!(
            dataset.dates(),
            vec![HistoricalKey::Year(1901), HistoricalKey::Year(1902)]
        );
    }
}
