//! World Bank Indicators API.

pub mod client;
pub mod dataset;
pub mod error;
pub mod url;

pub use client::IndicatorsApi;
pub use dataset::IndicatorDataset;
pub use error::IndicatorsError;
pub use url::QueryOptions;
