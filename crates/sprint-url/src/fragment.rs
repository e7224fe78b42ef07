//! Fragment parsing
//!
//! Splits a fragment into the project list and the keyed segments that
//! follow it. No state is touched here; see [`navigate`](crate::navigate).

use crate::error::DecodeError;
use crate::key::{
    split_values, UrlKey, KEY_SEPARATOR, LEGACY_SEGMENT_SEPARATOR, SEGMENT_SEPARATOR,
};
use serde::Serialize;

/// Segment with a recognized key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Segment key
    pub key: UrlKey,
    /// Value tokens, in fragment order
    pub values: Vec<String>,
}

/// Parsed fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Project tokens (names or symbolic groups)
    pub projects: Vec<String>,
    /// Recognized segments after the project list
    pub segments: Vec<Segment>,
    /// Keys that were not recognized, in fragment order
    pub ignored: Vec<String>,
}

impl Fragment {
    /// Parse a percent-decoded fragment, with or without the leading `#`
    ///
    /// The first part is always the project list; a `project_` prefix on it
    /// is optional. A `project` key in a later part is not a navigation and
    /// is recorded as ignored.
    ///
    /// # Errors
    /// Returns [`DecodeError::EmptyFragment`] when there is nothing to parse.
    pub fn parse(fragment: &str) -> Result<Self, DecodeError> {
        let body = fragment.strip_prefix('#').unwrap_or(fragment).trim();
        if body.is_empty() {
            return Err(DecodeError::EmptyFragment);
        }

        let mut parts = body.split([SEGMENT_SEPARATOR, LEGACY_SEGMENT_SEPARATOR]);
        let head = parts.next().unwrap_or_default();
        let project_prefix = format!("{}{}", UrlKey::Project.name(), KEY_SEPARATOR);
        let projects = split_values(head.strip_prefix(project_prefix.as_str()).unwrap_or(head));

        let mut segments = Vec::new();
        let mut ignored = Vec::new();
        for part in parts.filter(|part| !part.is_empty()) {
            let (name, raw) = part.split_once(KEY_SEPARATOR).unwrap_or((part, ""));
            match name.parse::<UrlKey>() {
                Ok(UrlKey::Project) | Err(_) => ignored.push(name.to_string()),
                Ok(key) => segments.push(Segment {
                    key,
                    values: split_values(raw),
                }),
            }
        }

        Ok(Self {
            projects,
            segments,
            ignored,
        })
    }

    /// Whether a key has a segment
    #[must_use]
    pub fn contains(&self, key: UrlKey) -> bool {
        self.segments.iter().any(|segment| segment.key == key)
    }
}
