use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the response cache and the page walker.
///
/// Network failures and upstream data errors are deliberately distinct
/// variants: a caller can tell "the network is down" apart from "my query
/// was malformed" without string matching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("failed to delete expired cache file '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),

    #[error("network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("response from {url} is not valid JSON")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The upstream answered, but with zero results or an explicit error
    /// message where data was expected.
    #[error("the URL {url} returned a bad response: {body}")]
    BadResponse { url: String, body: String },
}
