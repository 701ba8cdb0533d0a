//! World Bank Climate Data API.

pub mod client;
pub mod dataset;
pub mod definitions;
pub mod error;
pub mod merge;
pub mod plan;
pub mod record;

pub use client::ClimateApi;
pub use dataset::{HistoricalDataset, HistoricalKey, Interval, ModelledDataset};
pub use error::ClimateError;
pub use plan::{DataType, Variable};
