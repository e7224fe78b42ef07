//! Error types for fetching and shaping sprint data
//!
//! Covers:
//! - Resource fetch failures (filesystem, HTTP, malformed JSON)
//! - Request batches that failed or were overtaken by a newer navigation
//! - Resources whose shape does not fit the pipeline

use sprint_state::CatalogError;

/// Errors while fetching a single resource
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Reading a file under the data root failed
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Resource path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed before a response arrived
    #[error("request for '{path}' failed: {source}")]
    Http {
        /// Resource path
        path: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("'{path}' returned status {status}")]
    Status {
        /// Resource path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// Body is not valid JSON
    #[error("'{path}' is not valid JSON: {source}")]
    Json {
        /// Resource path
        path: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Document lacks its `data` member
    #[error("'{path}' has no data")]
    MissingData {
        /// Resource path
        path: String,
    },

    /// Startup documents do not form a valid catalog
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl FetchError {
    /// Create I/O error
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create HTTP error
    pub fn http(path: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error
    pub fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Resource path the error refers to, if any
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Io { path, .. }
            | Self::Http { path, .. }
            | Self::Status { path, .. }
            | Self::Json { path, .. }
            | Self::MissingData { path } => Some(path),
            Self::Catalog(_) => None,
        }
    }
}

/// Errors from a navigation's request batch
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// One of the fetches failed; nothing from the batch is used
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A newer navigation started while this batch was in flight
    #[error("request batch {generation} is stale (latest is {latest})")]
    Stale {
        /// Generation of this batch
        generation: u64,
        /// Generation of the newest navigation
        latest: u64,
    },

    /// Responses could not be assembled
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
}

impl RequestError {
    /// Whether the batch was discarded rather than failed
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Errors while shaping fetched data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Response count does not match the request plan
    #[error("expected {expected} responses, got {actual}")]
    ResponseCount {
        /// Requests in the plan
        expected: usize,
        /// Responses received
        actual: usize,
    },

    /// A sprint resource is not a list of sprint records
    #[error("resource '{key}' of '{project}' is not a list of sprints")]
    NotSprintList {
        /// Project name
        project: String,
        /// Resource key
        key: String,
    },

    /// A stacked feature refers to a later or missing entry
    #[error("feature '{feature}' cannot stack onto entry {onto}")]
    InvalidStack {
        /// Stacked feature
        feature: String,
        /// Referenced entry index
        onto: usize,
    },
}

/// Result type alias for batch loading
pub type RequestResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        let error = FetchError::Status {
            path: "data/alpha/default.json".to_string(),
            status: 404,
        };
        assert_eq!(
            error.to_string(),
            "'data/alpha/default.json' returned status 404"
        );
        assert_eq!(error.path(), Some("data/alpha/default.json"));
    }

    #[test]
    fn stale_is_not_a_failure() {
        let stale = RequestError::Stale {
            generation: 1,
            latest: 2,
        };
        assert!(stale.is_stale());
        assert_eq!(stale.to_string(), "request batch 1 is stale (latest is 2)");

        let failed = RequestError::from(FetchError::MissingData {
            path: "x".to_string(),
        });
        assert!(!failed.is_stale());
    }
}
