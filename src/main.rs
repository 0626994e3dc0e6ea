// src/main.rs

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use con_harvest::config::{DEFAULT_DOWNLOAD_DIR, DEFAULT_FAILED_FILE, DEFAULT_URLS_FILE};
use con_harvest::logging::init_logging;
use con_harvest::prelude::*;
use con_harvest::report;
use con_harvest::selector::{DEFAULT_MAX_BYTES, DEFAULT_MIN_BYTES, DEFAULT_SUFFIX};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Links whose path ends with the suffix.
    Suffix,
    /// The single link per page whose HEAD size is in range and is not HTML.
    SizeProbe,
}

/// Scan webpages for linked files and download them.
#[derive(Debug, Parser)]
#[command(name = "con_harvest", version)]
struct Args {
    /// File with one page URL per line
    #[arg(long, default_value = DEFAULT_URLS_FILE)]
    urls: PathBuf,

    /// Directory downloaded files are saved to
    #[arg(long, default_value = DEFAULT_DOWNLOAD_DIR)]
    output_dir: PathBuf,

    /// File receiving the URL of every failure
    #[arg(long, default_value = DEFAULT_FAILED_FILE)]
    failed_file: PathBuf,

    #[arg(long, value_enum, default_value_t = Policy::Suffix)]
    policy: Policy,

    /// Path suffix matched by the suffix policy
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// Smallest accepted size for the size-probe policy
    #[arg(long, default_value_t = DEFAULT_MIN_BYTES)]
    min_bytes: u64,

    /// Largest accepted size for the size-probe policy
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: u64,

    /// Also write the full results as JSON
    #[arg(long)]
    results_json: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        ensure!(
            self.min_bytes <= self.max_bytes,
            "--min-bytes ({}) must not exceed --max-bytes ({})",
            self.min_bytes,
            self.max_bytes
        );
        let policy = match self.policy {
            Policy::Suffix => SelectionPolicy::suffix(&self.suffix),
            Policy::SizeProbe => SelectionPolicy::size_probe(self.min_bytes, self.max_bytes),
        };
        Ok(RunConfig {
            urls_file: self.urls,
            download_dir: self.output_dir,
            failed_file: self.failed_file,
            results_json: self.results_json,
            policy,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = args.into_config()?;

    let contents = tokio::fs::read_to_string(&config.urls_file)
        .await
        .with_context(|| format!("reading {}", config.urls_file.display()))?;
    let pages = parse_url_list(&contents);
    info!(pages = pages.len(), policy = ?config.policy, "starting run");

    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .with_context(|| format!("creating {}", config.download_dir.display()))?;

    let http = ReqwestHttp::new();
    let manager = DownloadManager::new(&http, &DiskIndex, &config);
    let ledger = manager.run(pages.as_slice()).await;

    report::publish(&ledger, &config, &mut std::io::stdout()).await?;

    Ok(())
}
