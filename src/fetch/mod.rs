// src/fetch/mod.rs

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub mod urls;

pub use urls::SourceRef;

/// Anything that can hand back the raw bytes behind a URL.
pub trait SourceClient {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Plain HTTP GET over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Every request made through this source gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SourceClient for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        debug!(%url, "GET");
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .bytes()
            .await
            .with_context(|| format!("Reading body from {}", url))
    }
}
