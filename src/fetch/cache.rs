//! The response cache every physical API call goes through.
//!
//! Responses are stored one file per URL, named by the MD5 of the URL, and
//! considered fresh for one day (by file mtime). Writes go to a temp file in
//! the cache directory and are renamed into place, so a concurrent reader
//! never observes a partially-written entry.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bon::bon;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use log::{debug, info};
use tokio::fs;
use tokio::task;

use crate::fetch::error::FetchError;

/// Cached responses expire after one day.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// A URL fetcher returning the response body as text.
///
/// The built-in implementation is [`CachingFetcher`]; callers can substitute
/// their own (an in-memory map, a shared cache, a recorded fixture set) when
/// constructing the client. Implementations must deliver the whole body or
/// an error, never a partial response.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Disk-backed caching fetcher.
pub struct CachingFetcher {
    client: reqwest::Client,
    cache_dir: PathBuf,
    check_cache: bool,
    write_cache: bool,
    ttl: Duration,
}

#[bon]
impl CachingFetcher {
    /// Creates a fetcher caching into `cache_dir`.
    ///
    /// * `.check_cache(bool)`: consult the cache before hitting the network
    ///   (default `true`).
    /// * `.write_cache(bool)`: store fresh responses (default `true`).
    /// * `.ttl(Duration)`: entry lifetime (default one day).
    #[builder]
    pub fn new(
        #[builder(start_fn)] cache_dir: PathBuf,
        check_cache: Option<bool>,
        write_cache: Option<bool>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_dir,
            check_cache: check_cache.unwrap_or(true),
            write_cache: write_cache.unwrap_or(true),
            ttl: ttl.unwrap_or(DEFAULT_TTL),
        }
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_key(url))
    }

    /// Returns the cached body if a fresh entry exists; evicts expired ones.
    async fn read_cache(&self, path: &Path) -> Result<Option<String>, FetchError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("URL not found in cache");
                return Ok(None);
            }
            Err(e) => return Err(FetchError::CacheMetadataRead(path.to_path_buf(), e)),
        };

        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok());
        if let Some(age) = age {
            if age < self.ttl {
                debug!("retrieving response from cache at {path:?}");
                let body = fs::read_to_string(path)
                    .await
                    .map_err(|e| FetchError::CacheRead(path.to_path_buf(), e))?;
                return Ok(Some(body));
            }
        }

        debug!("cache file {path:?} has expired, removing");
        fs::remove_file(path)
            .await
            .map_err(|e| FetchError::CacheDeletion(path.to_path_buf(), e))?;
        Ok(None)
    }

    async fn fetch_live(&self, url: &str) -> Result<String, FetchError> {
        info!("fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))
    }

    /// Writes the body to a temp file in the cache directory, then renames it
    /// onto the final path. Rename within one directory is atomic, so other
    /// readers see either the old entry or the complete new one.
    async fn store(&self, path: &Path, body: &str) -> Result<(), FetchError> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| FetchError::CacheDirCreation(self.cache_dir.clone(), e))?;

        let cache_dir = self.cache_dir.clone();
        let path = path.to_path_buf();
        let body = body.to_string();
        task::spawn_blocking(move || {
            use std::io::Write;

            let mut temp = tempfile::NamedTempFile::new_in(&cache_dir)
                .map_err(|e| FetchError::CacheWrite(path.clone(), e))?;
            temp.write_all(body.as_bytes())
                .map_err(|e| FetchError::CacheWrite(path.clone(), e))?;
            temp.persist(&path)
                .map_err(|e| FetchError::CacheWrite(path, e.error))?;
            Ok::<(), FetchError>(())
        })
        .await??;
        debug!("response saved to cache");
        Ok(())
    }
}

impl Fetch for CachingFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let path = self.cache_path(url);

            if self.check_cache {
                if let Some(body) = self.read_cache(&path).await? {
                    return Ok(body);
                }
            }

            let body = self.fetch_live(url).await?;

            if self.write_cache {
                self.store(&path, &body).await?;
            }
            Ok(body)
        }
        .boxed()
    }
}

/// Content hash of the UTF-8 URL, used as the cache file name.
pub(crate) fn cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}
