//! Async client for the World Bank Indicators and Climate Data APIs.
//!
//! The [`WorldBank`] entry point hands out two service clients sharing one
//! disk-caching fetcher:
//!
//! - [`IndicatorsApi`]: entity catalogues (countries, topics, sources,
//!   income levels, lending types, regions) and per-country indicator time
//!   series, with pagination walked internally.
//! - [`ClimateApi`]: instrumental (observed) and modelled (GCM / ensemble)
//!   precipitation and temperature series. A single logical request fans
//!   out into the many physical URLs the upstream partitions data across,
//!   fetches them concurrently, and merges the fragments into one dataset.
//!
//! Locations are accepted as alpha-2 or alpha-3 ISO codes, World Bank
//! aggregate codes (e.g. `ARB`), or numeric basin IDs, and are normalized
//! internally.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wbapi::{DataType, WorldBank, WbApiError};
//!
//! # async fn run() -> Result<(), WbApiError> {
//! let client = WorldBank::new().await?;
//!
//! let population = client
//!     .indicators()
//!     .country_indicators()
//!     .indicators(vec!["SP.POP.TOTL".to_string()])
//!     .countries(vec!["GB".to_string(), "FR".to_string()])
//!     .call()
//!     .await
//!     .map_err(WbApiError::from)?;
//!
//! let temperature = client
//!     .climate()
//!     .temp_modelled()
//!     .data_type(DataType::AnnualAverage)
//!     .locations(vec!["GB".to_string()])
//!     .call()
//!     .await
//!     .map_err(WbApiError::from)?;
//! # Ok(())
//! # }
//! ```

mod climate;
mod error;
mod fetch;
mod indicators;
mod locations;
mod types;
mod utils;
mod worldbank;

pub use error::WbApiError;
pub use worldbank::WorldBank;

pub use climate::client::ClimateApi;
pub use climate::dataset::{HistoricalDataset, HistoricalKey, Interval, ModelledDataset};
pub use climate::definitions::{
    describe, CONTROL_PERIOD_STAT, CONTROL_PERIOD_VARIABLE, DATA_TYPES, GCMS, SRES, STATS,
    VARIABLES,
};
pub use climate::error::ClimateError;
pub use climate::merge::{DataMap, Fragment, MergedDataset};
pub use climate::plan::{
    plan, DataType, LocationKind, PhysicalRequest, TimeWindow, Variable, Variant, Windows,
};
pub use climate::record::{decode_rows, ClimateRecord, RecordSource, RecordValues};

pub use indicators::client::IndicatorsApi;
pub use indicators::dataset::{IndicatorData, IndicatorDataset};
pub use indicators::error::IndicatorsError;
pub use indicators::url::QueryOptions;

pub use fetch::cache::{CachingFetcher, Fetch, DEFAULT_TTL};
pub use fetch::error::FetchError;

pub use locations::{location_name, normalize, Alpha};

pub use types::date::{parse_period, InvalidPeriod};
pub use types::keys::{DataValue, ModelKey, MonthlySeries, TimeKey};
