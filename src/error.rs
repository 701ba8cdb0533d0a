use std::path::PathBuf;

use thiserror::Error;

use crate::climate::error::ClimateError;
use crate::fetch::error::FetchError;
use crate::indicators::error::IndicatorsError;

#[derive(Debug, Error)]
pub enum WbApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Climate(#[from] ClimateError),

    #[error(transparent)]
    Indicators(#[from] IndicatorsError),

    #[error("failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
