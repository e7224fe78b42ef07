//! Recognized fragment keys and delimiters

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between segments
pub const SEGMENT_SEPARATOR: char = '|';

/// Historical segment separator, accepted when decoding
pub const LEGACY_SEGMENT_SEPARATOR: char = '!';

/// Separator between values within a segment
pub const VALUE_SEPARATOR: char = '&';

/// Historical value separator, accepted when decoding
pub const LEGACY_VALUE_SEPARATOR: char = ',';

/// Separator between a key and its values
pub const KEY_SEPARATOR: char = '_';

/// Feature value prefix for team-level sourcing
pub const TEAM_PREFIX: &str = "team~";

/// Feature value prefix for project-level sourcing
pub const PROJECT_PREFIX: &str = "project~";

/// Key of a fragment segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKey {
    /// Selected projects (always the first segment)
    Project,
    /// Selected features with sourcing prefixes
    Feature,
    /// Sprint metadata columns
    Meta,
    /// Presentation format
    Format,
    /// Sprint window
    Count,
    /// Closed sprints only
    Closed,
    /// Include sprints older than the recent limit
    Old,
    /// Visible UI toggles
    Config,
}

impl UrlKey {
    /// Keys following the project segment, in emission order
    pub const OPTIONAL: [Self; 7] = [
        Self::Feature,
        Self::Meta,
        Self::Format,
        Self::Count,
        Self::Closed,
        Self::Old,
        Self::Config,
    ];

    /// Name as written in a fragment
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Feature => "feature",
            Self::Meta => "meta",
            Self::Format => "format",
            Self::Count => "count",
            Self::Closed => "closed",
            Self::Old => "old",
            Self::Config => "config",
        }
    }
}

impl Display for UrlKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UrlKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Self::Project),
            "feature" => Ok(Self::Feature),
            "meta" => Ok(Self::Meta),
            "format" => Ok(Self::Format),
            "count" => Ok(Self::Count),
            "closed" => Ok(Self::Closed),
            "old" => Ok(Self::Old),
            "config" => Ok(Self::Config),
            other => Err(other.to_string()),
        }
    }
}

/// Split a value list on either value separator, dropping empty tokens
#[must_use]
pub fn split_values(raw: &str) -> Vec<String> {
    raw.split([VALUE_SEPARATOR, LEGACY_VALUE_SEPARATOR])
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_roundtrip_through_names() {
        for key in UrlKey::OPTIONAL {
            assert_eq!(key.name().parse::<UrlKey>(), Ok(key));
        }
        assert_eq!("project".parse::<UrlKey>(), Ok(UrlKey::Project));
        assert_eq!("bogus".parse::<UrlKey>(), Err("bogus".to_string()));
    }

    #[test]
    fn split_values_accepts_both_separators() {
        assert_eq!(split_values("a&b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_values(""), Vec::<String>::new());
        assert_eq!(split_values("a&&b"), vec!["a", "b"]);
    }
}
