pub mod cache;
pub mod error;
pub mod paginated;

#[cfg(test)]
pub(crate) mod testing {
    //! Offline [`Fetch`] double: a map of canned URL -> body responses with
    //! a call counter.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;

    use crate::fetch::cache::Fetch;
    use crate::fetch::error::FetchError;

    #[derive(Default)]
    pub struct MockFetch {
        responses: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl MockFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.responses.insert(url.into(), body.into());
            self
        }

        pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
            self.responses.insert(url.into(), body.into());
        }

        /// Number of fetches served so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetch for MockFetch {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.responses.get(url).cloned().ok_or_else(|| {
                FetchError::BadResponse {
                    url: url.to_string(),
                    body: "no canned response for this URL".to_string(),
                }
            });
            async move { result }.boxed()
        }
    }
}
