// src/fetcher.rs

use crate::http::{HttpClient, HttpError};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid page url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Downloads a page and enumerates the links it carries.
pub struct PageFetcher<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> PageFetcher<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    /// GET `page` once and return every anchor `href`, resolved against it.
    pub async fn fetch_links(&self, page: &Url) -> Result<Vec<Url>, FetchError> {
        let html = self.client.get_text(page).await?;
        let links = extract_links(page, &html);
        debug!(page = %page, count = links.len(), "enumerated links");
        Ok(links)
    }
}

/// Parse a raw page URL as read from the input list.
pub fn parse_page_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// All `<a href>` targets of `html` in document order, made absolute against `base`.
/// Duplicates are kept; hrefs that do not resolve are dropped.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match base.join(href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(href, error = %e, "dropping unresolvable link");
                None
            }
        })
        .collect()
}
