//! Walks paginated Indicators API responses.
//!
//! The Indicators API answers `[header, content]` where the header carries
//! `page` and `pages`. This module fetches every page and concatenates the
//! content arrays into one logical response, iteratively, so a pathological
//! page count cannot blow the stack.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::fetch::cache::Fetch;
use crate::fetch::error::FetchError;

#[derive(Debug, Deserialize)]
struct PageHeader {
    page: u32,
    pages: u32,
}

/// Fetches `url` and every following page, returning all content rows in
/// page order.
///
/// # Errors
///
/// Returns [`FetchError::BadResponse`] when the first page reports zero
/// total pages or the body carries an upstream error `message`, with the
/// offending URL and raw body attached for diagnostics.
pub async fn fetch_all_pages(fetch: &dyn Fetch, url: &str) -> Result<Vec<Value>, FetchError> {
    let mut rows = Vec::new();
    let mut next_page = 1u32;

    loop {
        let page_url = if next_page == 1 {
            url.to_string()
        } else {
            format!("{url}&page={next_page}")
        };

        let body = fetch.fetch(&page_url).await?;
        let (header, mut content) = parse_page(&page_url, &body)?;
        debug!(
            "page {}/{} of {url}: {} rows",
            header.page,
            header.pages,
            content.len()
        );

        // A server that reports a stale page number for a later-page request
        // would otherwise keep the walk going forever.
        if header.page < next_page {
            return Err(FetchError::BadResponse {
                url: page_url,
                body,
            });
        }
        rows.append(&mut content);

        if header.page >= header.pages {
            break;
        }
        next_page = header.page + 1;
    }

    Ok(rows)
}

fn parse_page(url: &str, body: &str) -> Result<(PageHeader, Vec<Value>), FetchError> {
    let json: Value = serde_json::from_str(body).map_err(|source| FetchError::Json {
        url: url.to_string(),
        source,
    })?;

    let bad_response = || FetchError::BadResponse {
        url: url.to_string(),
        body: body.to_string(),
    };

    let parts = json.as_array().ok_or_else(bad_response)?;

    // Error responses are a one-element array with a "message" field.
    if parts.first().map(|p| p.get("message").is_some()) == Some(true) {
        return Err(bad_response());
    }

    let header: PageHeader = parts
        .first()
        .and_then(|h| serde_json::from_value(h.clone()).ok())
        .ok_or_else(bad_response)?;
    if header.pages == 0 {
        return Err(bad_response());
    }

    let content = parts
        .get(1)
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(bad_response)?;

    Ok((header, content))
}
