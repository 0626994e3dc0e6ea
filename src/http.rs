// src/http.rs

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP status {status} for url ({url})")]
    Status { status: u16, url: String },
}

/// Body of a GET response, delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, HttpError>>;

/// Headers learned from a HEAD request. Both are taken as declared by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadInfo {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

pub struct HttpBody {
    pub content_type: Option<String>,
    pub stream: ByteStream,
}

/// The network boundary. Every request is a single attempt; a non-success
/// status is reported as [`HttpError::Status`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String, HttpError>;
    async fn head(&self, url: &Url) -> Result<HeadInfo, HttpError>;
    async fn get(&self, url: &Url) -> Result<HttpBody, HttpError>;
}

/// [`HttpClient`] backed by `reqwest` with library-default settings.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

fn ensure_success(resp: Response) -> Result<Response, HttpError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(HttpError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

fn content_type(resp: &Response) -> Option<String> {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl HttpClient for ReqwestHttp {
    async fn get_text(&self, url: &Url) -> Result<String, HttpError> {
        let resp = ensure_success(self.client.get(url.clone()).send().await?)?;
        Ok(resp.text().await?)
    }

    async fn head(&self, url: &Url) -> Result<HeadInfo, HttpError> {
        let resp = ensure_success(self.client.head(url.clone()).send().await?)?;
        // Read the header itself: the body of a HEAD response is always empty.
        let content_length = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        Ok(HeadInfo {
            content_length,
            content_type: content_type(&resp),
        })
    }

    async fn get(&self, url: &Url) -> Result<HttpBody, HttpError> {
        let resp = ensure_success(self.client.get(url.clone()).send().await?)?;
        let content_type = content_type(&resp);
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(HttpError::from))
            .boxed();
        Ok(HttpBody { content_type, stream })
    }
}
