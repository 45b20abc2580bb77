//! Outbound HTTP access to remote twtxt files and registry dumps.

use crate::registry::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Default bound on every outbound request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// URL path suffixes that identify another registry's status dump.
pub const REGISTRY_DUMP_SUFFIXES: &[&str] = &["/api/plain/tweets"];

/// What a fetched URL turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// One user's own twtxt file.
    SingleUserFeed(String),
    /// Another registry's aggregated status listing.
    RegistryDump(String),
}

/// Source of remote registry data.
///
/// `Index` only talks to the network through this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` and classifies the body.
    async fn fetch(&self, url: &str) -> Result<Resource>;

    /// Cheap change check. Returns the remote length signature,
    /// or an empty string if the server does not report one.
    async fn probe_content_length(&self, url: &str) -> Result<String>;
}

/// Validates that `url` is an absolute http(s) URL.
pub fn parse_remote_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| RegistryError::invalid_argument(format!("invalid url {:?}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(RegistryError::invalid_argument(format!(
            "unsupported scheme {:?} in {}",
            other, url
        ))),
    }
}

/// `true` if the URL path names a registry dump endpoint.
pub fn is_registry_dump(url: &Url) -> bool {
    let path = url.path().trim_end_matches('/');
    REGISTRY_DUMP_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Resource> {
        let parsed = parse_remote_url(url)?;
        let dump = is_registry_dump(&parsed);

        let response = self.http_client.get(parsed).send().await?;

        let text_plain = response
            .headers()
            .get_all(CONTENT_TYPE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/plain"));
        if !text_plain {
            return Err(RegistryError::upstream(format!(
                "received non-text/plain response body from {}",
                url
            )));
        }

        if response.status() != StatusCode::OK {
            return Err(RegistryError::upstream(format!(
                "didn't get 200 from remote server, received {}: {}",
                response.status(),
                url
            )));
        }

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes from {} (dump={})", body.len(), url, dump);

        if dump {
            Ok(Resource::RegistryDump(body))
        } else {
            Ok(Resource::SingleUserFeed(body))
        }
    }

    async fn probe_content_length(&self, url: &str) -> Result<String> {
        let parsed = parse_remote_url(url)?;
        let response = self.http_client.head(parsed).send().await?;

        if !response.status().is_success() {
            return Err(RegistryError::upstream(format!(
                "HEAD {} returned {}",
                url,
                response.status()
            )));
        }

        let signature = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Ok(signature)
    }
}
