// src/report.rs

use crate::config::RunConfig;
use crate::models::Ledger;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("writing {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Render the end-of-run summary: counts, then every failure in detail.
pub fn render_summary(ledger: &Ledger, failed_file: &Path, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "\nDownload Summary:")?;
    writeln!(out, "Successful downloads: {}", ledger.successful.len())?;
    writeln!(out, "Failed downloads: {}", ledger.failed.len())?;
    writeln!(out, "Skipped files: {}", ledger.skipped.len())?;

    if !ledger.failed.is_empty() {
        writeln!(out, "\nFailed Downloads:")?;
        for failure in &ledger.failed {
            writeln!(out, "URL: {}", failure.url)?;
            writeln!(out, "Error: {}", failure.error)?;
            writeln!(out, "{}", "-".repeat(40))?;
        }
        writeln!(out, "\nFailed URLs have been written to {}", failed_file.display())?;
    }
    Ok(())
}

/// Persist the run's output files, then render the summary to `out`.
/// Nothing is rendered when a file cannot be written.
pub async fn publish(ledger: &Ledger, config: &RunConfig, out: &mut impl Write) -> Result<(), ReportError> {
    write_failed_urls(ledger, &config.failed_file).await?;
    if let Some(path) = &config.results_json {
        write_json(ledger, path).await?;
    }
    render_summary(ledger, &config.failed_file, out)?;
    Ok(())
}

async fn write_file(path: &Path, contents: String) -> Result<(), ReportError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Overwrite `path` with the URL of every failure, one per line, in ledger order.
pub async fn write_failed_urls(ledger: &Ledger, path: &Path) -> Result<(), ReportError> {
    let mut contents = String::new();
    for url in ledger.failed_urls() {
        contents.push_str(url);
        contents.push('\n');
    }
    write_file(path, contents).await?;
    info!(path = %path.display(), count = ledger.failed.len(), "wrote failed urls");
    Ok(())
}

/// Dump the complete ledger as pretty JSON.
pub async fn write_json(ledger: &Ledger, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_file(path, json).await?;
    info!(path = %path.display(), "wrote results");
    Ok(())
}
