// src/config.rs

use crate::selector::SelectionPolicy;
use std::path::PathBuf;

pub const DEFAULT_URLS_FILE: &str = "URLs.txt";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_FAILED_FILE: &str = "failedURLs.txt";

/// Everything a run needs to know, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Newline-separated list of pages to scan.
    pub urls_file: PathBuf,
    pub download_dir: PathBuf,
    /// Receives the URL of every failure, one per line.
    pub failed_file: PathBuf,
    /// Optional JSON dump of the whole ledger.
    pub results_json: Option<PathBuf>,
    pub policy: SelectionPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            urls_file: PathBuf::from(DEFAULT_URLS_FILE),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            failed_file: PathBuf::from(DEFAULT_FAILED_FILE),
            results_json: None,
            policy: SelectionPolicy::default(),
        }
    }
}

/// Page URLs from the contents of the URL list: trimmed, blank lines dropped.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
