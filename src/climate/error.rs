use thiserror::Error;

use crate::fetch::error::FetchError;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to decode response rows from {url}")]
    RowDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response row from {url}: {detail}")]
    UnexpectedRow { url: String, detail: String },

    #[error("unknown derived statistic: {0}")]
    UnknownStat(String),

    #[error("unknown GCM or ensemble key: {0}")]
    UnknownModel(String),
}
