// src/manager.rs

use crate::config::RunConfig;
use crate::downloader::{Downloader, FileIndex};
use crate::fetcher::{parse_page_url, FetchError, PageFetcher};
use crate::http::HttpClient;
use crate::models::{Candidate, Ledger};
use crate::selector::{SelectError, SelectionPolicy};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

/// Why a whole page was recorded as failed.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Walks the page list one page at a time and records every outcome.
pub struct DownloadManager<'a> {
    client: &'a dyn HttpClient,
    policy: SelectionPolicy,
    downloader: Downloader<'a>,
}

impl<'a> DownloadManager<'a> {
    pub fn new(client: &'a dyn HttpClient, index: &'a dyn FileIndex, config: &RunConfig) -> Self {
        Self {
            client,
            policy: config.policy.clone(),
            downloader: Downloader::new(client, index, config.download_dir.clone()),
        }
    }

    /// Process `pages` in order. A failing page or file never stops the run.
    pub async fn run<S: AsRef<str>>(&self, pages: &[S]) -> Ledger {
        let mut ledger = Ledger::new();
        for page in pages {
            let page = page.as_ref();
            self.process_page(page, &mut ledger)
                .instrument(info_span!("page", url = page))
                .await;
        }
        ledger
    }

    async fn process_page(&self, page: &str, ledger: &mut Ledger) {
        let candidates = match self.discover(page).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Failed to process {}: {}", page, e);
                ledger.record_failure(page, &e);
                return;
            }
        };

        info!(count = candidates.len(), "selected candidates");
        for candidate in &candidates {
            let url = candidate.url.as_str();
            match self.downloader.download(candidate, self.policy.sniffs_body()).await {
                Ok(outcome) => ledger.record_outcome(url, &outcome),
                Err(e) => {
                    warn!("Failed to download {}: {}", url, e);
                    ledger.record_failure(url, &e);
                }
            }
        }
    }

    async fn discover(&self, page: &str) -> Result<Vec<Candidate>, PageError> {
        let page_url = parse_page_url(page)?;
        let links = PageFetcher::new(self.client).fetch_links(&page_url).await?;
        Ok(self.policy.select(self.client, &page_url, links).await?)
    }
}
