//! Indicators API URL grammar.
//!
//! URL shape: `{base}[{language}/][source/{n}/ | topic/{n}/]{resource}?{query}`.
//! The query string always carries `format=json` and `per_page=10000`, and
//! defaults to `mrv=1` (most recent value) when the caller gives neither a
//! date range nor an `mrv` count. Parameters are emitted in sorted order so
//! the same logical request always renders the same URL; the response cache
//! keys on the URL string.

use std::collections::BTreeMap;

use bon::Builder;

use crate::indicators::error::IndicatorsError;

/// Query options shared by every Indicators API request.
///
/// `topic` and `source` are mutually exclusive; there is deliberately no
/// `page` option, pagination is walked internally.
#[derive(Builder, Debug, Clone, Default)]
pub struct QueryOptions {
    /// Two-letter response language, e.g. `es`; prepended to the path.
    pub language: Option<String>,
    /// Restrict to one source catalogue; becomes a `source/{n}/` prefix.
    pub source: Option<u32>,
    /// Restrict to one topic; becomes a `topic/{n}/` prefix.
    pub topic: Option<u32>,
    /// A year or `start:end` range, e.g. `2000:2010` or `2010M02`.
    pub date: Option<String>,
    /// Most recent N values.
    pub mrv: Option<u32>,
    /// Backfill missing values from the most recent known one.
    pub gapfill: Option<bool>,
    /// `M` or `Q`, for sub-annual `mrv` queries.
    pub frequency: Option<String>,
    /// Income level codes, e.g. `LIC`.
    pub income_level: Option<Vec<String>>,
    /// Lending type codes, e.g. `IBD`.
    pub lending_type: Option<Vec<String>>,
    /// Region codes, e.g. `AFR`.
    pub region: Option<Vec<String>>,
}

/// Renders a full request URL for `resource` (e.g. `country` or
/// `countries/GBR/indicators/SP.POP.TOTL`).
pub fn build_url(
    base_url: &str,
    resource: &str,
    options: &QueryOptions,
) -> Result<String, IndicatorsError> {
    if options.topic.is_some() && options.source.is_some() {
        return Err(IndicatorsError::TopicAndSource);
    }

    let mut path = String::new();
    if let Some(language) = &options.language {
        path.push_str(language);
        path.push('/');
    }
    if let Some(source) = options.source {
        path.push_str(&format!("source/{source}/"));
    }
    if let Some(topic) = options.topic {
        path.push_str(&format!("topic/{topic}/"));
    }
    path.push_str(resource);

    let mut query: BTreeMap<&str, String> = BTreeMap::new();
    query.insert("format", "json".to_string());
    query.insert("per_page", "10000".to_string());
    if let Some(date) = &options.date {
        query.insert("date", date.clone());
    }
    if let Some(mrv) = options.mrv {
        query.insert("mrv", mrv.to_string());
    }
    if query.get("date").is_none() && query.get("mrv").is_none() {
        query.insert("mrv", "1".to_string());
    }
    if let Some(gapfill) = options.gapfill {
        query.insert("gapfill", if gapfill { "Y" } else { "N" }.to_string());
    }
    if let Some(frequency) = &options.frequency {
        query.insert("frequency", frequency.clone());
    }
    if let Some(codes) = &options.income_level {
        query.insert("incomeLevel", codes.join(";"));
    }
    if let Some(codes) = &options.lending_type {
        query.insert("lendingType", codes.join(";"));
    }
    if let Some(codes) = &options.region {
        query.insert("region", codes.join(";"));
    }

    let query_string: Vec<String> = query
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    Ok(format!("{base_url}{path}?{}", query_string.join("&")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://api.worldbank.org/";

    #[test]
    fn defaults_to_most_recent_value() {
        let url = build_url(BASE, "country", &QueryOptions::default()).unwrap();
        assert_eq!(
            url,
            "http://api.worldbank.org/country?format=json&mrv=1&per_page=10000"
        );
    }

    #[test]
    fn date_suppresses_the_mrv_default() {
        let options = QueryOptions::builder().date("2000:2010".to_string()).build();
        let url = build_url(BASE, "country", &options).unwrap();
        assert!(url.contains("date=2000:2010"));
        assert!(!url.contains("mrv="));
    }

    #[test]
    fn prefixes_stack_language_then_topic() {
        let options = QueryOptions::builder()
            .language("es".to_string())
            .topic(5)
            .build();
        let url = build_url(BASE, "indicator", &options).unwrap();
        assert!(url.starts_with("http://api.worldbank.org/es/topic/5/indicator?"));
    }

    #[test]
    fn source_becomes_a_path_prefix() {
        let options = QueryOptions::builder().source(2).build();
        let url = build_url(BASE, "indicator", &options).unwrap();
        assert!(url.starts_with("http://api.worldbank.org/source/2/indicator?"));
    }

    #[test]
    fn topic_and_source_together_are_rejected() {
        let options = QueryOptions::builder().topic(5).source(2).build();
        assert!(matches!(
            build_url(BASE, "indicator", &options),
            Err(IndicatorsError::TopicAndSource)
        ));
    }

    #[test]
    fn query_parameters_render_in_sorted_order() {
        let options = QueryOptions::builder()
            .mrv(5)
            .gapfill(true)
            .frequency("Q".to_string())
            .region(vec!["AFR".to_string(), "EAP".to_string()])
            .build();
        let url = build_url(BASE, "country", &options).unwrap();
        assert_eq!(
            url,
            "http://api.worldbank.org/country?format=json&frequency=Q&gapfill=Y&mrv=5&per_page=10000&region=AFR;EAP"
        );
        // Identical options must render the identical URL.
        assert_eq!(url, build_url(BASE, "country", &options).unwrap());
    }
}
