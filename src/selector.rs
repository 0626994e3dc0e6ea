// src/selector.rs

use crate::http::HttpClient;
use crate::models::Candidate;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Smallest declared size accepted by the size probe (2 MiB).
pub const DEFAULT_MIN_BYTES: u64 = 2 * 1024 * 1024;
/// Largest declared size accepted by the size probe (30 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 30 * 1024 * 1024;
pub const DEFAULT_SUFFIX: &str = "con";

const HTML_CONTENT_TYPE: &str = "text/html";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("No .{suffix} files found")]
    NoCandidates { suffix: String },
    #[error("expected exactly one candidate, found {found}")]
    Ambiguous { found: usize },
}

/// How a page's links are narrowed down to the files worth downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Every link whose path ends with `suffix`, compared case-insensitively.
    /// This is a plain text match, so "icon" qualifies for "con".
    Suffix { suffix: String },
    /// Probe every link with HEAD and keep the single one whose declared size
    /// lies in `min_bytes..=max_bytes` and whose type is not HTML.
    SizeProbe { min_bytes: u64, max_bytes: u64 },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::suffix(DEFAULT_SUFFIX)
    }
}

impl SelectionPolicy {
    pub fn suffix(suffix: &str) -> Self {
        Self::Suffix {
            suffix: suffix.to_lowercase(),
        }
    }

    pub fn size_probe(min_bytes: u64, max_bytes: u64) -> Self {
        Self::SizeProbe {
            min_bytes,
            max_bytes,
        }
    }

    /// Whether downloaded bodies must be checked for an HTML page before saving.
    /// Only the suffix policy does this; the size probe trusts its HEAD filter.
    pub fn sniffs_body(&self) -> bool {
        matches!(self, Self::Suffix { .. })
    }

    /// Narrow `links` found on `page` down to candidates.
    pub async fn select(
        &self,
        client: &dyn HttpClient,
        page: &Url,
        links: Vec<Url>,
    ) -> Result<Vec<Candidate>, SelectError> {
        match self {
            Self::Suffix { suffix } => {
                let candidates: Vec<Candidate> = links
                    .into_iter()
                    .filter(|link| path_has_suffix(link, suffix))
                    .map(Candidate::new)
                    .collect();
                if candidates.is_empty() {
                    info!(page = %page, "no .{} files found", suffix);
                    return Err(SelectError::NoCandidates {
                        suffix: suffix.clone(),
                    });
                }
                debug!(page = %page, count = candidates.len(), "suffix candidates");
                Ok(candidates)
            }
            Self::SizeProbe {
                min_bytes,
                max_bytes,
            } => {
                let mut candidates = Vec::new();
                for link in links {
                    let info = match client.head(&link).await {
                        Ok(info) => info,
                        Err(e) => {
                            debug!(link = %link, error = %e, "HEAD probe failed, ignoring link");
                            continue;
                        }
                    };
                    let Some(length) = info.content_length else {
                        debug!(link = %link, "no content-length, ignoring link");
                        continue;
                    };
                    let is_html = info
                        .content_type
                        .as_deref()
                        .map(|t| t.to_lowercase().contains(HTML_CONTENT_TYPE))
                        .unwrap_or(false);
                    if (*min_bytes..=*max_bytes).contains(&length) && !is_html {
                        debug!(link = %link, length, "size probe match");
                        candidates.push(Candidate::new(link));
                    }
                }
                if candidates.len() != 1 {
                    info!(page = %page, found = candidates.len(), "size probe did not find a single file");
                    return Err(SelectError::Ambiguous {
                        found: candidates.len(),
                    });
                }
                Ok(candidates)
            }
        }
    }
}

fn path_has_suffix(link: &Url, suffix: &str) -> bool {
    link.path().to_lowercase().ends_with(&suffix.to_lowercase())
}
