//! Client for the World Bank Climate Data API.
//!
//! One logical call fans out into many physical requests (see
//! [`crate::climate::plan`]); fragments are fetched concurrently and fail
//! fast on the first error, then merged into a dataset view.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bon::bon;
use futures_util::future::try_join_all;
use log::debug;
use serde::Deserialize;

use crate::climate::dataset::{HistoricalDataset, HistoricalKey, Interval, ModelledDataset};
use crate::climate::definitions::{describe, GCMS, STATS};
use crate::climate::error::ClimateError;
use crate::climate::merge::{Fragment, MergedDataset};
use crate::climate::plan::{plan, DataType, Variable, Windows};
use crate::climate::record::decode_rows;
use crate::fetch::cache::Fetch;
use crate::locations::{self, Alpha};
use crate::types::keys::ModelKey;

const BASE_URL: &str = "http://climatedataapi.worldbank.org/climateweb/rest/";

/// Access to modelled (GCM) and instrumental (observed) climate series.
#[derive(Clone)]
pub struct ClimateApi {
    fetch: Arc<dyn Fetch>,
    base_url: String,
    windows: Windows,
}

#[bon]
impl ClimateApi {
    pub(crate) fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self::with_base_url(fetch, BASE_URL.to_string())
    }

    pub(crate) fn with_base_url(fetch: Arc<dyn Fetch>, base_url: String) -> Self {
        Self {
            fetch,
            base_url,
            windows: Windows::default(),
        }
    }

    /// Modelled precipitation (`pr`), in millimeters.
    ///
    /// * `.data_type(DataType)`: aggregation to request.
    /// * `.locations(Vec<String>)`: country codes or basin IDs.
    /// * `.models(Vec<String>)`: optional GCM/ensemble filter, applied after
    ///   the merge.
    #[builder]
    pub async fn precip_modelled(
        &self,
        data_type: DataType,
        locations: Vec<String>,
        models: Option<Vec<String>>,
    ) -> Result<ModelledDataset, ClimateError> {
        self.modelled(Variable::Precipitation, data_type, &locations, models.as_deref())
            .await
    }

    /// Modelled temperature (`tas`), in degrees Celsius.
    #[builder]
    pub async fn temp_modelled(
        &self,
        data_type: DataType,
        locations: Vec<String>,
        models: Option<Vec<String>>,
    ) -> Result<ModelledDataset, ClimateError> {
        self.modelled(Variable::Temperature, data_type, &locations, models.as_deref())
            .await
    }

    /// A derived ensemble statistic such as `tmin_means` or `ppt_days`.
    ///
    /// Derived statistics exist only as ensemble percentiles, over their own
    /// window table. The `stat` code is validated against the published
    /// catalogue before any request is made.
    #[builder]
    pub async fn derived_stat(
        &self,
        stat: String,
        data_type: DataType,
        locations: Vec<String>,
        models: Option<Vec<String>>,
    ) -> Result<ModelledDataset, ClimateError> {
        let code = stat.to_lowercase();
        if describe(STATS, &code).is_none() {
            return Err(ClimateError::UnknownStat(stat));
        }
        self.modelled(Variable::Stat(code), data_type, &locations, models.as_deref())
            .await
    }

    /// Observed precipitation from the instrumental (CRU) record.
    #[builder]
    pub async fn precip_instrumental(
        &self,
        interval: Interval,
        locations: Vec<String>,
    ) -> Result<HistoricalDataset, ClimateError> {
        self.instrumental("pr", interval, &locations).await
    }

    /// Observed temperature from the instrumental (CRU) record.
    #[builder]
    pub async fn temp_instrumental(
        &self,
        interval: Interval,
        locations: Vec<String>,
    ) -> Result<HistoricalDataset, ClimateError> {
        self.instrumental("tas", interval, &locations).await
    }

    async fn modelled(
        &self,
        variable: Variable,
        data_type: DataType,
        locations: &[String],
        models: Option<&[String]>,
    ) -> Result<ModelledDataset, ClimateError> {
        // Validate the filter up front so a typo fails before 16 fetches.
        let filter = models.map(ModelFilter::parse).transpose()?;

        let requests = plan(locations, &variable, self.windows);
        debug!(
            "fanning out {} requests for {} locations",
            requests.len(),
            locations.len()
        );

        let fetches = requests.iter().map(|request| {
            let url = request.url(&self.base_url, data_type, &variable);
            async move {
                let body = self.fetch.fetch(&url).await?;
                let records = decode_rows(&url, &body)?;
                Ok::<Fragment, ClimateError>(Fragment::new(url, records))
            }
        });
        let fragments = try_join_all(fetches).await?;

        let mut merged = MergedDataset::from_fragments(fragments);
        if let Some(filter) = filter {
            merged = merged.retain_models(|key| filter.keeps(key));
        }
        Ok(ModelledDataset::new(merged, data_type, variable))
    }

    async fn instrumental(
        &self,
        variable: &str,
        interval: Interval,
        locations: &[String],
    ) -> Result<HistoricalDataset, ClimateError> {
        let fetches = locations.iter().map(|location| async move {
            let (token, segment, key) = if locations::is_basin(location) {
                (location.clone(), "basin", location.clone())
            } else {
                (
                    locations::normalize(location, Alpha::Three),
                    "country",
                    locations::normalize(location, Alpha::Two),
                )
            };
            let url = format!(
                "{}v1/{}/cru/{}/{}/{}.json",
                self.base_url,
                segment,
                variable,
                interval.code(),
                token,
            );
            let body = self.fetch.fetch(&url).await?;
            let series = decode_instrumental(&url, &body, interval)?;
            Ok::<_, ClimateError>((key, series))
        });

        let mut data = BTreeMap::new();
        for (key, series) in try_join_all(fetches).await? {
            data.entry(key).or_insert(series);
        }
        Ok(HistoricalDataset::new(interval, data))
    }
}

#[derive(Debug, Deserialize)]
struct InstrumentalRow {
    year: Option<i32>,
    month: Option<u32>,
    data: Option<f64>,
}

/// Decodes one instrumental response body. Upstream numbers months 0-11;
/// keys here use calendar months 1-12. Rows with a null value are dropped.
fn decode_instrumental(
    url: &str,
    body: &str,
    interval: Interval,
) -> Result<BTreeMap<HistoricalKey, f64>, ClimateError> {
    let rows: Vec<InstrumentalRow> =
        serde_json::from_str(body).map_err(|source| ClimateError::RowDecode {
            url: url.to_string(),
            source,
        })?;

    let mut series = BTreeMap::new();
    for row in rows {
        let Some(value) = row.data else { continue };
        let key = match interval {
            Interval::Month => {
                let month = row.month.ok_or_else(|| ClimateError::UnexpectedRow {
                    url: url.to_string(),
                    detail: "monthly row carries no 'month' field".to_string(),
                })?;
                HistoricalKey::Month(month + 1)
            }
            Interval::Year | Interval::Decade => {
                let year = row.year.ok_or_else(|| ClimateError::UnexpectedRow {
                    url: url.to_string(),
                    detail: "row carries no 'year' field".to_string(),
                })?;
                HistoricalKey::Year(year)
            }
        };
        series.entry(key).or_insert(value);
    }
    Ok(series)
}

/// A parsed model filter.
///
/// `ensemble` keeps every percentile; `ensemble_NN` keeps that percentile
/// only; anything else names a literal GCM. Codes are validated against the
/// published catalogue at parse time.
struct ModelFilter {
    gcms: BTreeSet<String>,
    all_ensembles: bool,
    percentiles: BTreeSet<u32>,
}

impl ModelFilter {
    fn parse(models: &[String]) -> Result<Self, ClimateError> {
        let mut filter = Self {
            gcms: BTreeSet::new(),
            all_ensembles: false,
            percentiles: BTreeSet::new(),
        };
        for model in models {
            let code = model.to_lowercase();
            if describe(GCMS, &code).is_none() {
                return Err(ClimateError::UnknownModel(model.clone()));
            }
            if code == "ensemble" {
                filter.all_ensembles = true;
            } else if let Some(percentile) = code.strip_prefix("ensemble_") {
                if let Ok(percentile) = percentile.parse() {
                    filter.percentiles.insert(percentile);
                }
            } else {
                filter.gcms.insert(code);
            }
        }
        Ok(filter)
    }

    fn keeps(&self, key: &ModelKey) -> bool {
        match key {
            ModelKey::Gcm(name) => self.gcms.contains(name),
            ModelKey::Ensemble(percentile) => {
                self.all_ensembles || self.percentiles.contains(percentile)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MockFetch;

    const TEST_BASE: &str = "http://climate-test.invalid/rest/";

    fn direct_body(gcm: &str, window: (i32, i32), value: f64) -> String {
        let scenario = if window.0 >= 2020 {
            r#""scenario": "a2","#
        } else {
            ""
        };
        format!(
            r#"[{{"gcm": "{gcm}", {scenario} "fromYear": {}, "toYear": {}, "annualData": [{value}]}}]"#,
            window.0, window.1
        )
    }

    fn ensemble_body(window: (i32, i32)) -> String {
        let scenario = if window.0 >= 2020 {
            r#""scenario": "a2","#
        } else {
            ""
        };
        format!(
            r#"[
                {{"percentile": 10, {scenario} "fromYear": {from}, "toYear": {to}, "annualVal": [1.0]}},
                {{"percentile": 50, {scenario} "fromYear": {from}, "toYear": {to}, "annualVal": [2.0]}},
                {{"percentile": 90, {scenario} "fromYear": {from}, "toYear": {to}, "annualVal": [3.0]}}
            ]"#,
            from = window.0,
            to = window.1
        )
    }

    /// Canned responses for every URL a one-location pr call plans.
    fn full_mock_for_precip() -> MockFetch {
        let mut mock = MockFetch::new();
        let requests = plan(
            &["GB".to_string()],
            &Variable::Precipitation,
            Windows::default(),
        );
        for request in &requests {
            let url = request.url(TEST_BASE, DataType::AnnualAverage, &Variable::Precipitation);
            let window = (request.window.start, request.window.end);
            let body = if url.contains("/ensemble/") {
                ensemble_body(window)
            } else {
                direct_body("cnrm_cm3", window, 5.0)
            };
            mock.insert(url, body);
        }
        mock
    }

    fn api(mock: MockFetch) -> ClimateApi {
        ClimateApi::with_base_url(Arc::new(mock), TEST_BASE.to_string())
    }

    #[tokio::test]
    async fn modelled_call_fans_out_and_merges_both_variants() {
        let api = api(full_mock_for_precip());
        let dataset = api
            .precip_modelled()
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .call()
            .await
            .unwrap();

        let models = dataset.gcms();
        assert!(models.contains(&ModelKey::Gcm("cnrm_cm3".into())));
        assert!(models.contains(&ModelKey::Ensemble(10)));
        assert!(models.contains(&ModelKey::Ensemble(50)));
        assert!(models.contains(&ModelKey::Ensemble(90)));

        // Four historical and four forward windows per variant.
        assert_eq!(dataset.dates().len(), 8);
        assert_eq!(
            dataset.scenarios().iter().cloned().collect::<Vec<_>>(),
            vec!["a2".to_string()]
        );
        let series = &dataset.as_dict()[&ModelKey::Gcm("cnrm_cm3".into())]["GB"];
        assert_eq!(series.len(), 8);
    }

    #[tokio::test]
    async fn model_filter_restricts_the_merged_dataset() {
        let api = api(full_mock_for_precip());
        let dataset = api
            .precip_modelled()
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .models(vec!["ensemble_50".to_string()])
            .call()
            .await
            .unwrap();

        assert_eq!(dataset.gcms(), vec![ModelKey::Ensemble(50)]);
        // Coverage metadata survives filtering.
        assert_eq!(dataset.dates().len(), 8);
    }

    #[tokio::test]
    async fn ensemble_filter_keeps_every_percentile() {
        let api = api(full_mock_for_precip());
        let dataset = api
            .precip_modelled()
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .models(vec!["ensemble".to_string()])
            .call()
            .await
            .unwrap();

        assert_eq!(
            dataset.gcms(),
            vec![
                ModelKey::Ensemble(10),
                ModelKey::Ensemble(50),
                ModelKey::Ensemble(90)
            ]
        );
    }

    #[tokio::test]
    async fn unknown_model_fails_before_any_fetch() {
        let mock = MockFetch::new();
        let api = api(mock);
        let err = api
            .precip_modelled()
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .models(vec!["hadcm9000".to_string()])
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::UnknownModel(name) if name == "hadcm9000"));
    }

    #[tokio::test]
    async fn unknown_stat_is_rejected() {
        let api = api(MockFetch::new());
        let err = api
            .derived_stat()
            .stat("bogus_stat".to_string())
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::UnknownStat(code) if code == "bogus_stat"));
    }

    #[tokio::test]
    async fn failed_fragment_fails_the_whole_call() {
        // Only some of the planned URLs have canned responses.
        let mut mock = MockFetch::new();
        let requests = plan(
            &["GB".to_string()],
            &Variable::Precipitation,
            Windows::default(),
        );
        let url = requests[0].url(TEST_BASE, DataType::AnnualAverage, &Variable::Precipitation);
        mock.insert(url, direct_body("cnrm_cm3", (1920, 1939), 1.0));

        let api = api(mock);
        let result = api
            .precip_modelled()
            .data_type(DataType::AnnualAverage)
            .locations(vec!["GB".to_string()])
            .call()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn instrumental_months_are_reindexed_to_calendar_months() {
        let url = format!("{TEST_BASE}v1/country/cru/tas/month/GBR.json");
        let body = r#"[
            {"month": 0, "data": 3.4},
            {"month": 11, "data": 4.1},
            {"month": 5, "data": null}
        ]"#;
        let api = api(MockFetch::new().with(url, body));

        let dataset = api
            .temp_instrumental()
            .interval(Interval::Month)
            .locations(vec!["GB".to_string()])
            .call()
            .await
            .unwrap();

        let series = &dataset.as_dict()["GB"];
        assert_eq!(series[&HistoricalKey::Month(1)], 3.4);
        assert_eq!(series[&HistoricalKey::Month(12)], 4.1);
        // Null values are dropped.
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn instrumental_basins_pass_numeric_ids_through() {
        let url = format!("{TEST_BASE}v1/basin/cru/pr/year/302.json");
        let body = r#"[{"year": 1901, "data": 78.5}]"#;
        let api = api(MockFetch::new().with(url, body));

        let dataset = api
            .precip_instrumental()
            .interval(Interval::Year)
            .locations(vec!["302".to_string()])
            .call()
            .await
            .unwrap();

        assert_eq!(dataset.as_dict()["302"][&HistoricalKey::Year(1901)], 78.5);
    }
}
