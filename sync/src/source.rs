//! Anchor sources — where candidate anchor lists come from.
//!
//! Sources only fetch and parse. Deciding which list to trust is left to
//! [`crate::consensus`] and the scheduler.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anchor_types::AnchorList;

use crate::{AnchorConfig, AnchorError};

/// Connection timeout for anchor endpoints.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The single origin an anchor service draws from.
pub enum AnchorSource {
    /// JSON file on disk, re-read on every refresh.
    Local(PathBuf),
    /// Independently operated HTTP endpoints.
    Remote(RemoteFetcher),
    /// Fixed list supplied at construction.
    Static(AnchorList),
}

impl AnchorSource {
    /// Build the source named by `config`.
    ///
    /// Fails unless exactly one of local path, remote URLs or static anchors is set.
    pub fn from_config(config: &AnchorConfig) -> Result<Self, AnchorError> {
        if config.source_count() != 1 {
            return Err(AnchorError::Config(
                "exactly one of local_path, remote_urls or static_anchors must be set".into(),
            ));
        }

        if let Some(path) = &config.local_path {
            return Ok(Self::Local(path.clone()));
        }
        if let Some(urls) = &config.remote_urls {
            if urls.is_empty() {
                return Err(AnchorError::Config("remote_urls is empty".into()));
            }
            let timeout = config.timing().request_timeout;
            return Ok(Self::Remote(RemoteFetcher::new(urls.clone(), timeout)));
        }
        let anchors = config.static_anchors.clone().unwrap_or_default();
        Ok(Self::Static(anchors))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
            Self::Static(_) => "static",
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Read and parse an anchor file.
pub fn read_local(path: &Path) -> Result<AnchorList, AnchorError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AnchorError::Parse(format!("{}: {e}", path.display())))
}

/// Fetches anchor lists from every configured endpoint concurrently.
pub struct RemoteFetcher {
    urls: Vec<String>,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl RemoteFetcher {
    pub fn new(urls: Vec<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .unwrap_or_default();
        Self { urls, http_client }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Query every endpoint in parallel.
    ///
    /// Each endpoint is queried via `tokio::spawn`; a failing endpoint is
    /// logged and contributes nothing. Results keep the input order. Fails
    /// only when no endpoint produced a list.
    pub async fn fetch_all(&self) -> Result<Vec<AnchorList>, AnchorError> {
        let mut handles = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            let client = self.http_client.clone();
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                let result = fetch_anchor_list(&client, &url).await;
                (url, result)
            }));
        }

        let mut lists = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((_, Ok(list))) => lists.push(list),
                Ok((url, Err(e))) => {
                    tracing::warn!(%url, error = %e, "anchor endpoint failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "anchor fetch task join error");
                }
            }
        }

        if lists.is_empty() {
            return Err(AnchorError::AllEndpointsFailed(self.urls.len()));
        }
        Ok(lists)
    }
}

/// Perform a single anchor list request.
async fn fetch_anchor_list(client: &reqwest::Client, url: &str) -> Result<AnchorList, AnchorError> {
    let fetch_err = |reason: String| AnchorError::Fetch {
        url: url.to_string(),
        reason,
    };

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            fetch_err(format!("request timed out: {e}"))
        } else if e.is_connect() {
            fetch_err(format!("connection failed: {e}"))
        } else {
            fetch_err(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP status {}", response.status())));
    }

    response
        .json::<AnchorList>()
        .await
        .map_err(|e| AnchorError::Parse(format!("{url}: {e}")))
}
