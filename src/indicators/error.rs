use thiserror::Error;

use crate::fetch::error::FetchError;

#[derive(Debug, Error)]
pub enum IndicatorsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("'topic' and 'source' cannot both be set on one request")]
    TopicAndSource,

    #[error("response row from {url} is missing key {key:?}")]
    MissingKey { url: String, key: String },
}
