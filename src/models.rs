// src/models.rs

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// A link chosen by the active selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: Url,
}

impl Candidate {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Local file name: the final path segment of the URL, percent-decoded.
    /// `None` when the segment is empty, not UTF-8, or decodes to something
    /// that is not a single path component.
    pub fn file_name(&self) -> Option<String> {
        let raw = self.url.path_segments()?.next_back()?;
        let name = percent_decode_str(raw).decode_utf8().ok()?;
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
            return None;
        }
        Some(name.into_owned())
    }
}

/// What happened to a candidate that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(PathBuf),
    /// A file of that name was already present, nothing was fetched.
    Skipped(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub url: String,
    pub filepath: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureEntry {
    pub url: String,
    pub error: String,
}

/// Append-only record of every outcome of a run, in the order they happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    pub successful: Vec<FileEntry>,
    pub failed: Vec<FailureEntry>,
    pub skipped: Vec<FileEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, url: &str, filepath: &Path) {
        self.successful.push(FileEntry {
            url: url.to_string(),
            filepath: filepath.to_path_buf(),
        });
    }

    pub fn record_skip(&mut self, url: &str, filepath: &Path) {
        self.skipped.push(FileEntry {
            url: url.to_string(),
            filepath: filepath.to_path_buf(),
        });
    }

    pub fn record_failure(&mut self, url: &str, error: impl ToString) {
        self.failed.push(FailureEntry {
            url: url.to_string(),
            error: error.to_string(),
        });
    }

    pub fn record_outcome(&mut self, url: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Saved(path) => self.record_success(url, path),
            Outcome::Skipped(path) => self.record_skip(url, path),
        }
    }

    pub fn failed_urls(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|f| f.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(raw: &str) -> Candidate {
        Candidate::new(Url::parse(raw).unwrap())
    }

    #[test]
    fn file_name_is_last_path_segment() {
        assert_eq!(candidate("http://h/maps/dm1.con").file_name().as_deref(), Some("dm1.con"));
        assert_eq!(candidate("http://h/a/b.CON?x=1#top").file_name().as_deref(), Some("b.CON"));
        assert_eq!(candidate("http://h/dir/").file_name(), None);
        assert_eq!(candidate("http://h").file_name(), None);
    }

    #[test]
    fn file_name_is_decoded() {
        let base = Url::parse("http://h/maps/index.html").unwrap();
        let spaced = Candidate::new(base.join("Dust 2.con").unwrap());
        assert_eq!(spaced.url.as_str(), "http://h/maps/Dust%202.con");
        assert_eq!(spaced.file_name().as_deref(), Some("Dust 2.con"));

        let cyrillic = Candidate::new(base.join("карта.con").unwrap());
        assert_eq!(cyrillic.file_name().as_deref(), Some("карта.con"));
    }

    #[test]
    fn file_name_rejects_unsafe_decodings() {
        assert_eq!(candidate("http://h/a%2Fb.con").file_name(), None);
        assert_eq!(candidate("http://h/a%00b.con").file_name(), None);
        assert_eq!(candidate("http://h/%FF%FE.con").file_name(), None);
        assert_eq!(candidate("http://h/%2E%2E").file_name(), None);
    }

    #[test]
    fn ledger_keeps_insertion_order() {
        let mut ledger = Ledger::new();
        ledger.record_failure("http://h/1", "boom");
        ledger.record_outcome("http://h/2", &Outcome::Saved(PathBuf::from("d/2")));
        ledger.record_failure("http://h/3", "bang");
        ledger.record_outcome("http://h/4", &Outcome::Skipped(PathBuf::from("d/4")));

        assert_eq!(ledger.failed_urls().collect::<Vec<_>>(), vec!["http://h/1", "http://h/3"]);
        assert_eq!(ledger.successful[0].filepath, PathBuf::from("d/2"));
        assert_eq!(ledger.skipped[0].url, "http://h/4");
    }
}
