//! Assembly of physical-response fragments into one merged dataset.
//!
//! Fragments may arrive in any order; merging is commutative because every
//! row addresses a unique `(model, location, time)` slot and duplicate
//! slots keep their first value. The merge never fails: conflicting rows
//! are a caller-error overlap the contract resolves silently.

use std::collections::{BTreeMap, BTreeSet};

use crate::climate::record::{ClimateRecord, RecordSource, RecordValues};
use crate::locations::{self, Alpha};
use crate::types::keys::{DataValue, ModelKey, MonthlySeries, TimeKey};

/// One physical call's decoded outcome.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub url: String,
    /// Canonical location key, derived once from the URL's trailing path
    /// segment: alpha-2 for countries, the numeric ID for basins.
    pub location: String,
    pub records: Vec<ClimateRecord>,
}

impl Fragment {
    pub fn new(url: String, records: Vec<ClimateRecord>) -> Self {
        let location = location_from_url(&url);
        Self {
            url,
            location,
            records,
        }
    }
}

/// The trailing path segment (minus `.json`) names the location.
fn location_from_url(url: &str) -> String {
    let tail = url.rsplit('/').next().unwrap_or(url);
    let token = tail.strip_suffix(".json").unwrap_or(tail);
    locations::normalize(token, Alpha::Two)
}

/// Nested map shape shared by the merge and its filtered views.
pub type DataMap = BTreeMap<ModelKey, BTreeMap<String, BTreeMap<TimeKey, DataValue>>>;

/// The aggregate of all fragments of one logical call.
///
/// Built once, immutable thereafter; scenario- and model-filtered views are
/// computed fresh on each read and never mutate this structure.
#[derive(Debug, Clone, Default)]
pub struct MergedDataset {
    data: DataMap,
    windows: BTreeSet<(i32, i32)>,
    scenarios: BTreeSet<String>,
}

impl MergedDataset {
    /// Merges fragments in the order given. First write wins for duplicate
    /// time keys; since the planner never emits overlapping slots, the
    /// result is identical for any permutation of the input.
    pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        let mut merged = Self::default();
        for fragment in fragments {
            merged.apply(fragment);
        }
        merged
    }

    fn apply(&mut self, fragment: Fragment) {
        for record in fragment.records {
            let model_key = match &record.source {
                RecordSource::Model(name) => ModelKey::Gcm(name.clone()),
                RecordSource::Ensemble(percentile) => ModelKey::Ensemble(*percentile),
            };

            self.windows.insert((record.from_year, record.to_year));

            let time_key = match &record.scenario {
                Some(scenario) => {
                    self.scenarios.insert(scenario.clone());
                    TimeKey::Scenario {
                        year: record.to_year,
                        scenario: scenario.clone(),
                    }
                }
                None => TimeKey::Year(record.to_year),
            };

            let value = match record.values {
                RecordValues::Annual(v) => DataValue::Annual(v),
                RecordValues::Monthly(months) => {
                    DataValue::Monthly(MonthlySeries::new(months))
                }
            };

            self.data
                .entry(model_key)
                .or_default()
                .entry(fragment.location.clone())
                .or_default()
                .entry(time_key)
                .or_insert(value);
        }
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    /// The `(start, end)` windows observed across all non-empty fragments.
    pub fn windows(&self) -> &BTreeSet<(i32, i32)> {
        &self.windows
    }

    /// Every scenario tag observed across all fragments.
    pub fn scenarios(&self) -> &BTreeSet<String> {
        &self.scenarios
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelKey> {
        self.data.keys()
    }

    /// A copy containing only the models the predicate accepts. Coverage
    /// metadata is preserved, so a later query can still report the full
    /// window set.
    pub fn retain_models(&self, mut keep: impl FnMut(&ModelKey) -> bool) -> Self {
        Self {
            data: self
                .data
                .iter()
                .filter(|(key, _)| keep(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            windows: self.windows.clone(),
            scenarios: self.scenarios.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::record::{ClimateRecord, RecordSource, RecordValues};

    fn record(
        source: RecordSource,
        scenario: Option<&str>,
        window: (i32, i32),
        value: f64,
    ) -> ClimateRecord {
        ClimateRecord {
            source,
            scenario: scenario.map(str::to_string),
            from_year: window.0,
            to_year: window.1,
            values: RecordValues::Annual(value),
        }
    }

    fn sample_fragments() -> Vec<Fragment> {
        vec![
            Fragment::new(
                "http://t.invalid/v1/country/annualavg/pr/1920/1939/GBR.json".into(),
                vec![
                    record(RecordSource::Model("cnrm_cm3".into()), None, (1920, 1939), 1.0),
                    record(RecordSource::Model("ipsl_cm4".into()), None, (1920, 1939), 2.0),
                ],
            ),
            Fragment::new(
                "http://t.invalid/v1/country/annualavg/pr/2020/2039/GBR.json".into(),
                vec![
                    record(
                        RecordSource::Model("cnrm_cm3".into()),
                        Some("a2"),
                        (2020, 2039),
                        3.0,
                    ),
                    record(
                        RecordSource::Model("cnrm_cm3".into()),
                        Some("b1"),
                        (2020, 2039),
                        4.0,
                    ),
                ],
            ),
            Fragment::new(
                "http://t.invalid/v1/country/annualavg/ensemble/pr/2020/2039/GBR.json".into(),
                vec![
                    record(RecordSource::Ensemble(10), Some("a2"), (2020, 2039), 5.0),
                    record(RecordSource::Ensemble(90), Some("a2"), (2020, 2039), 6.0),
                ],
            ),
        ]
    }

    #[test]
    fn merges_into_nested_map_keyed_by_model_location_time() {
        let merged = MergedDataset::from_fragments(sample_fragments());

        let cnrm = &merged.data()[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];
        assert_eq!(cnrm[&TimeKey::Year(1939)], DataValue::Annual(1.0));
        assert_eq!(
            cnrm[&TimeKey::Scenario {
                year: 2039,
                scenario: "b1".into()
            }],
            DataValue::Annual(4.0)
        );

        assert!(merged
            .data()
            .contains_key(&ModelKey::Ensemble(10)));
        assert_eq!(
            merged.windows().iter().copied().collect::<Vec<_>>(),
            vec![(1920, 1939), (2020, 2039)]
        );
        assert_eq!(
            merged.scenarios().iter().cloned().collect::<Vec<_>>(),
            vec!["a2".to_string(), "b1".to_string()]
        );
    }

    #[test]
    fn merge_is_order_independent() {
        let fragments = sample_fragments();
        let forward = MergedDataset::from_fragments(fragments.clone());
        let mut reversed_fragments = fragments;
        reversed_fragments.reverse();
        let reversed = MergedDataset::from_fragments(reversed_fragments);

        assert_eq!(forward.data(), reversed.data());
        assert_eq!(forward.windows(), reversed.windows());
        assert_eq!(forward.scenarios(), reversed.scenarios());
    }

    #[test]
    fn first_write_wins_on_duplicate_keys() {
        let url = "http://t.invalid/v1/country/annualavg/pr/1920/1939/GBR.json";
        let first = Fragment::new(
            url.into(),
            vec![record(
                RecordSource::Model("cnrm_cm3".into()),
                None,
                (1920, 1939),
                1.0,
            )],
        );
        let duplicate = Fragment::new(
            url.into(),
            vec![record(
                RecordSource::Model("cnrm_cm3".into()),
                None,
                (1920, 1939),
                99.0,
            )],
        );

        let merged = MergedDataset::from_fragments([first, duplicate]);
        let bucket = &merged.data()[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];
        assert_eq!(bucket[&TimeKey::Year(1939)], DataValue::Annual(1.0));
    }

    #[test]
    fn fragment_location_is_derived_from_url_tail() {
        let country = Fragment::new(
            "http://t.invalid/v1/country/mavg/pr/1920/1939/GBR.json".into(),
            vec![],
        );
        assert_eq!(country.location, "GB");

        let basin = Fragment::new(
            "http://t.invalid/v1/basin/mavg/pr/1920/1939/302.json".into(),
            vec![],
        );
        assert_eq!(basin.location, "302");
    }

    #[test]
    fn retain_models_filters_without_touching_the_original() {
        let merged = MergedDataset::from_fragments(sample_fragments());
        let only_ensembles = merged.retain_models(|k| matches!(k, ModelKey::Ensemble(_)));

        assert_eq!(only_ensembles.data().len(), 2);
        assert!(only_ensembles
            .models()
            .all(|k| matches!(k, ModelKey::Ensemble(_))));
        // Original unchanged, coverage metadata preserved.
        assert_eq!(merged.data().len(), 4);
        assert_eq!(only_ensembles.windows(), merged.windows());
    }
}
