//! The main entry point for the World Bank API client.
//!
//! A [`WorldBank`] instance owns one shared fetcher (disk-caching by
//! default) and hands out the per-service clients.

use std::path::PathBuf;
use std::sync::Arc;

use crate::climate::ClimateApi;
use crate::error::WbApiError;
use crate::fetch::cache::{CachingFetcher, Fetch};
use crate::indicators::IndicatorsApi;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};

/// The client for both World Bank APIs.
///
/// Create one with [`WorldBank::new()`] for the default cache directory, or
/// [`WorldBank::with_cache_folder()`] to control where responses are stored.
/// Every physical request made by either service client goes through the
/// same fetcher, so the two share one cache.
///
/// # Examples
///
/// ```rust
/// # use wbapi::{WorldBank, WbApiError};
/// # async fn run() -> Result<(), WbApiError> {
/// let client = WorldBank::new().await?;
/// let climate = client.climate();
/// let indicators = client.indicators();
/// # Ok(())
/// # }
/// ```
pub struct WorldBank {
    fetch: Arc<dyn Fetch>,
}

impl WorldBank {
    /// Creates a client caching under the system cache directory
    /// (e.g. `~/.cache/wbapi_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`WbApiError::CacheDirResolution`] if no system cache
    /// directory can be determined, and [`WbApiError::CacheDirCreation`] if
    /// it cannot be created.
    pub async fn new() -> Result<Self, WbApiError> {
        let cache_folder = get_cache_dir().map_err(WbApiError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Creates a client caching into `cache_folder`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`WbApiError::CacheDirCreation`] if the directory cannot be
    /// created, or if the path exists and is not a directory.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, WbApiError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| WbApiError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            fetch: Arc::new(CachingFetcher::builder(cache_folder).build()),
        })
    }

    /// Creates a client over a caller-supplied fetcher. Useful for shared
    /// caches or recorded fixtures.
    pub fn with_fetch(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }

    /// The Climate Data API client.
    pub fn climate(&self) -> ClimateApi {
        ClimateApi::new(Arc::clone(&self.fetch))
    }

    /// The Indicators API client.
    pub fn indicators(&self) -> IndicatorsApi {
        IndicatorsApi::new(Arc::clone(&self.fetch))
    }
}
