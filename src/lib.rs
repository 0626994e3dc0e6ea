pub mod config;
pub mod downloader;
pub mod fetcher;
pub mod http;
pub mod logging;
pub mod manager;
pub mod models;
pub mod report;
pub mod selector;

/// Convenient type alias exposing common structs.
pub mod prelude {
    pub use crate::config::{parse_url_list, RunConfig};
    pub use crate::downloader::{DiskIndex, DownloadError, Downloader, FileIndex};
    pub use crate::http::{HttpClient, ReqwestHttp};
    pub use crate::manager::DownloadManager;
    pub use crate::models::{Candidate, Ledger, Outcome};
    pub use crate::selector::SelectionPolicy;
}
