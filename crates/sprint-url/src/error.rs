//! Error types for fragment decoding
//!
//! Decoding is tolerant: these errors are reported per segment in a
//! [`NavigationReport`](crate::NavigationReport) instead of aborting the
//! navigation.

use crate::key::UrlKey;
use serde::Serialize;

/// Errors while decoding a fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodeError {
    /// Fragment carries no segments at all
    #[error("empty fragment")]
    EmptyFragment,

    /// Sprint window value is not an integer
    #[error("invalid count value: '{0}'")]
    InvalidCount(String),

    /// Segment needs at least one value
    #[error("missing value for '{0}'")]
    MissingValue(UrlKey),

    /// Format name is not among the known formats
    #[error("unknown format: '{0}'")]
    UnknownFormat(String),

    /// Upstream data does not support the flag
    #[error("'{0}' is not available for this data")]
    Unavailable(UrlKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            DecodeError::InvalidCount("x".to_string()).to_string(),
            "invalid count value: 'x'"
        );
        assert_eq!(
            DecodeError::MissingValue(UrlKey::Count).to_string(),
            "missing value for 'count'"
        );
        assert_eq!(
            DecodeError::Unavailable(UrlKey::Old).to_string(),
            "'old' is not available for this data"
        );
    }
}
