//! Resource fetchers
//!
//! A [`ResourceFetcher`] resolves a path relative to the data root to a JSON
//! document. There is no retry and no caching: a failure is final for the
//! batch it belongs to.

use crate::error::FetchError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of JSON documents under a data root
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch and parse one document
    async fn fetch(&self, path: &str) -> Result<Value, FetchError>;
}

/// Fetcher reading files under a directory
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create fetcher rooted at a directory
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let bytes = tokio::fs::read(self.root.join(path))
            .await
            .map_err(|e| FetchError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::json(path, e))
    }
}

/// Fetcher requesting documents from a base URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create fetcher for a base URL with a per-request timeout
    ///
    /// # Errors
    /// Returns `FetchError::Http` if the client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::http(base_url.clone(), e))?;
        Ok(Self { client, base_url })
    }

    /// URL of a path under the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| FetchError::http(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::http(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::json(path, e))
    }
}

/// Fetcher serving documents from memory
///
/// Unknown paths fail like a missing file.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, Value>,
}

impl MemoryFetcher {
    /// Create empty fetcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a document at a path
    #[must_use]
    pub fn with_document(mut self, path: impl Into<String>, document: Value) -> Self {
        self.insert(path, document);
        self
    }

    /// Add or replace a document
    pub fn insert(&mut self, path: impl Into<String>, document: Value) {
        self.documents.insert(path.into(), document);
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        self.documents.get(path).cloned().ok_or_else(|| {
            FetchError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }
}
