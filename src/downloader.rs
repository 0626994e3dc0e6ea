use std::path::{Path, PathBuf};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::http::{ByteStream, HttpClient, HttpError};
use crate::models::{Candidate, Outcome};

/// Number of leading body bytes searched for the HTML marker.
const SNIFF_LEN: usize = 20;
const HTML_MARKER: &[u8] = b"<!DOCTYPE html>";
const HTML_CONTENT_TYPE: &str = "text/html";

/// Custom errors for download operations.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot derive a file name from {0}")]
    NoFileName(String),
    #[error("File appears to be HTML, not binary")]
    HtmlPayload,
}

/// Answers whether a file is already present in the download directory.
pub trait FileIndex: Send + Sync {
    fn contains(&self, path: &Path) -> bool;
}

/// [`FileIndex`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskIndex;

impl FileIndex for DiskIndex {
    fn contains(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Saves candidates into one directory, at most once per file name.
pub struct Downloader<'a> {
    client: &'a dyn HttpClient,
    index: &'a dyn FileIndex,
    destination: PathBuf,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a dyn HttpClient, index: &'a dyn FileIndex, destination: PathBuf) -> Self {
        Self { client, index, destination }
    }

    /// Fetch `candidate` unless a file of the same name exists.
    ///
    /// With `sniff_body` set, a response declared as `text/html` or whose first
    /// bytes carry a doctype marker is rejected and nothing is written.
    pub async fn download(&self, candidate: &Candidate, sniff_body: bool) -> Result<Outcome, DownloadError> {
        let name = candidate
            .file_name()
            .ok_or_else(|| DownloadError::NoFileName(candidate.url.to_string()))?;
        let path = self.destination.join(&name);

        if self.index.contains(&path) {
            info!("Skipping existing file: {}", name);
            return Ok(Outcome::Skipped(path));
        }

        let body = self.client.get(&candidate.url).await?;
        if sniff_body && is_html_type(body.content_type.as_deref()) {
            debug!(url = %candidate.url, "declared content type is HTML");
            return Err(DownloadError::HtmlPayload);
        }

        let temp_path = temporary_path(&path);
        let written = match write_body(&temp_path, body.stream, sniff_body).await {
            Ok(bytes) => tokio::fs::rename(&temp_path, &path)
                .await
                .map(|_| bytes)
                .map_err(DownloadError::from),
            Err(e) => Err(e),
        };
        match written {
            Ok(bytes) => {
                info!(bytes, "Successfully downloaded: {}", name);
                Ok(Outcome::Saved(path))
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }
}

/// Stream the body into `path`, returning the number of bytes written.
async fn write_body(path: &Path, mut stream: ByteStream, sniff_body: bool) -> Result<u64, DownloadError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await?;

    let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
    let mut sniffed = !sniff_body;
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        if !sniffed {
            let take = (SNIFF_LEN - head.len()).min(bytes.len());
            head.extend_from_slice(&bytes[..take]);
            if head.len() == SNIFF_LEN {
                sniffed = true;
                if looks_like_html(&head) {
                    return Err(DownloadError::HtmlPayload);
                }
            }
        }
        file.write_all(&bytes).await?;
        written += bytes.len() as u64;
    }

    // Bodies shorter than the sniff window.
    if !sniffed && looks_like_html(&head) {
        return Err(DownloadError::HtmlPayload);
    }

    file.flush().await?;
    Ok(written)
}

/// e.g. for "downloads/dm1.con" returns "downloads/dm1.con.part"
fn temporary_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".part");
    PathBuf::from(os)
}

fn is_html_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|t| t.to_lowercase().contains(HTML_CONTENT_TYPE))
        .unwrap_or(false)
}

fn looks_like_html(head: &[u8]) -> bool {
    head.windows(HTML_MARKER.len()).any(|w| w == HTML_MARKER)
}
