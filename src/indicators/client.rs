//! Client for the World Bank Indicators API.

use std::collections::BTreeMap;
use std::sync::Arc;

use bon::bon;
use futures_util::future::try_join_all;
use log::debug;
use serde_json::Value;

use crate::fetch::cache::Fetch;
use crate::fetch::paginated::fetch_all_pages;
use crate::indicators::dataset::{IndicatorData, IndicatorDataset};
use crate::indicators::error::IndicatorsError;
use crate::indicators::url::{build_url, QueryOptions};
use crate::locations::{self, Alpha};

const BASE_URL: &str = "http://api.worldbank.org/";

/// Access to indicator time series and the API's entity catalogues.
#[derive(Clone)]
pub struct IndicatorsApi {
    fetch: Arc<dyn Fetch>,
    base_url: String,
}

#[bon]
impl IndicatorsApi {
    pub(crate) fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self::with_base_url(fetch, BASE_URL.to_string())
    }

    pub(crate) fn with_base_url(fetch: Arc<dyn Fetch>, base_url: String) -> Self {
        Self { fetch, base_url }
    }

    /// Indicator values for a set of countries.
    ///
    /// * `.indicators(Vec<String>)`: API indicator codes, e.g. `SP.POP.TOTL`.
    /// * `.countries(Vec<String>)`: country codes; all countries when absent.
    /// * `.options(QueryOptions)`: date range, language, and so on.
    ///
    /// One paginated call is made per indicator code, concurrently, failing
    /// fast on the first error.
    #[builder]
    pub async fn country_indicators(
        &self,
        indicators: Vec<String>,
        countries: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<IndicatorDataset, IndicatorsError> {
        let options = options.unwrap_or_default();
        let country_string = match &countries {
            Some(codes) => codes
                .iter()
                .map(|code| locations::normalize(code, Alpha::Three))
                .collect::<Vec<_>>()
                .join(";"),
            None => "all".to_string(),
        };

        let calls = indicators.iter().map(|indicator| {
            let resource = format!("countries/{country_string}/indicators/{indicator}");
            let url = build_url(&self.base_url, &resource, &options);
            async move {
                let url = url?;
                let rows = fetch_all_pages(self.fetch.as_ref(), &url).await?;
                Ok::<_, IndicatorsError>((url, rows))
            }
        });
        let responses = try_join_all(calls).await?;

        let mut data = IndicatorData::new();
        let mut indicator_names = BTreeMap::new();
        let mut country_names = BTreeMap::new();

        for (url, rows) in responses {
            debug!("{}: {} data rows", url, rows.len());
            for row in rows {
                let indicator_id = nested_str(&row, &url, "indicator", "id")?;
                let indicator_name = nested_str(&row, &url, "indicator", "value")?;
                let country_id = nested_str(&row, &url, "country", "id")?;
                let country_name = nested_str(&row, &url, "country", "value")?;
                let date = row
                    .get("date")
                    .and_then(Value::as_str)
                    .ok_or_else(|| missing_key(&url, "date"))?
                    .to_string();

                data.entry(indicator_id.clone())
                    .or_default()
                    .entry(country_id.clone())
                    .or_default()
                    .entry(date)
                    .or_insert_with(|| numeric_value(row.get("value")));

                indicator_names.entry(indicator_id).or_insert(indicator_name);
                country_names.entry(country_id).or_insert(country_name);
            }
        }

        Ok(IndicatorDataset::new(data, indicator_names, country_names))
    }

    /// Country metadata, keyed by alpha-2 code.
    #[builder]
    pub async fn countries(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        let codes = codes.map(|codes| {
            codes
                .iter()
                .map(|code| locations::normalize(code, Alpha::Three))
                .collect()
        });
        self.keyed_entities("country", "iso2Code", codes, options.unwrap_or_default())
            .await
    }

    /// Indicator metadata, keyed by indicator code.
    #[builder]
    pub async fn indicators(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("indicator", "id", codes, options.unwrap_or_default())
            .await
    }

    /// Topic metadata, keyed by topic ID.
    #[builder]
    pub async fn topics(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("topic", "id", codes, options.unwrap_or_default())
            .await
    }

    /// Source catalogue metadata, keyed by source ID.
    #[builder]
    pub async fn sources(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("source", "id", codes, options.unwrap_or_default())
            .await
    }

    /// Income level metadata, keyed by level code.
    #[builder]
    pub async fn income_levels(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("incomelevel", "id", codes, options.unwrap_or_default())
            .await
    }

    /// Lending type metadata, keyed by type code.
    #[builder]
    pub async fn lending_types(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("lendingtype", "id", codes, options.unwrap_or_default())
            .await
    }

    /// Region metadata, keyed by region code.
    #[builder]
    pub async fn regions(
        &self,
        codes: Option<Vec<String>>,
        options: Option<QueryOptions>,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        self.keyed_entities("region", "code", codes, options.unwrap_or_default())
            .await
    }

    /// Shared fetch for every entity catalogue: one resource name, one
    /// response key to index rows by.
    async fn keyed_entities(
        &self,
        resource: &str,
        key: &str,
        codes: Option<Vec<String>>,
        options: QueryOptions,
    ) -> Result<BTreeMap<String, Value>, IndicatorsError> {
        let resource = match &codes {
            Some(codes) if !codes.is_empty() => format!("{resource}/{}", codes.join(";")),
            _ => resource.to_string(),
        };
        let url = build_url(&self.base_url, &resource, &options)?;
        let rows = fetch_all_pages(self.fetch.as_ref(), &url).await?;

        let mut entities = BTreeMap::new();
        for row in rows {
            let id = entity_key(&row, key).ok_or_else(|| missing_key(&url, key))?;
            entities.entry(id).or_insert(row);
        }
        Ok(entities)
    }
}

fn missing_key(url: &str, key: &str) -> IndicatorsError {
    IndicatorsError::MissingKey {
        url: url.to_string(),
        key: key.to_string(),
    }
}

fn nested_str(row: &Value, url: &str, outer: &str, inner: &str) -> Result<String, IndicatorsError> {
    row.get(outer)
        .and_then(|v| v.get(inner))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing_key(url, &format!("{outer}.{inner}")))
}

/// The response key may arrive as a string or a bare number.
fn entity_key(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Indicator values arrive as JSON numbers, numeric strings, or null.
fn numeric_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
