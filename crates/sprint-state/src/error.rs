//! Error types for the state model
//!
//! Covers:
//! - Catalog documents that cannot seed a state
//! - Explicit selections naming unknown catalog entries

/// Errors while building state from startup metadata
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A catalog document did not have the expected shape
    #[error("invalid catalog document '{document}': {source}")]
    InvalidDocument {
        /// Document name (e.g. `features.json`)
        document: String,
        /// Deserialization failure
        #[source]
        source: serde_json::Error,
    },

    /// Sprint limit must be non-negative
    #[error("invalid sprint limit: {0}")]
    InvalidSprintLimit(i64),
}

impl CatalogError {
    /// Create invalid document error
    pub fn invalid_document(document: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidDocument {
            document: document.into(),
            source,
        }
    }
}

/// Errors from explicit state mutations
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Formatter name is not among the known formatters
    #[error("unknown formatter: '{0}'")]
    UnknownFormatter(String),

    /// Project name is not among the known projects
    #[error("unknown project: '{0}'")]
    UnknownProject(String),

    /// Catalog error while constructing state
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type alias for state operations
pub type StateResult<T> = Result<T, StateError>;
